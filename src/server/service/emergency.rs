//! Emergency contacts and alert escalation.
//!
//! Raising an alert enqueues one SMS per emergency contact through the notification
//! fan-out. `sos` and `harassment` alerts also reach every active administrator, and an
//! alert raised on a trip reaches the other people on that trip.

use chrono::Utc;
use entity::sea_orm_active_enums::{EmergencyType, UserRole};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::json;

use crate::server::{
    data::{
        booking::BookingRepository, emergency::EmergencyRepository, trip::TripRepository,
        user::UserRepository,
    },
    error::AppError,
    model::{
        emergency::{
            CreateEmergencyAlertParams, CreateEmergencyContactParams, EmergencyAlert,
            EmergencyContact, UpdateEmergencyContactParams, MAX_EMERGENCY_CONTACTS,
        },
        notification::{NotificationEvent, NotificationKind},
        user::User,
    },
    service::notification::NotificationService,
    util::phone::validate_phone,
};

/// Alert types escalated to administrators.
pub fn escalates_to_admins(emergency_type: EmergencyType) -> bool {
    matches!(emergency_type, EmergencyType::Sos | EmergencyType::Harassment)
}

fn type_label(emergency_type: EmergencyType) -> &'static str {
    match emergency_type {
        EmergencyType::Sos => "SOS",
        EmergencyType::Accident => "accident",
        EmergencyType::Breakdown => "breakdown",
        EmergencyType::Harassment => "harassment",
        EmergencyType::Other => "emergency",
    }
}

pub struct EmergencyService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EmergencyService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds an emergency contact. The first contact becomes primary.
    ///
    /// # Returns
    /// - `Ok(EmergencyContact)` - Stored contact with a normalized phone
    /// - `Err(AppError::BadRequest)` - Blank name, invalid phone, or five contacts already
    /// - `Err(AppError::Conflict)` - A contact with this phone already exists
    pub async fn create_contact(
        &self,
        mut params: CreateEmergencyContactParams,
    ) -> Result<EmergencyContact, AppError> {
        if params.name.is_empty() {
            return Err(AppError::BadRequest("Contact name is required".to_string()));
        }
        params.phone_number = validate_phone(&params.phone_number)?;

        let txn = self.db.begin().await?;
        let repo = EmergencyRepository::new(&txn);

        let count = repo.count_contacts(params.user_id).await?;
        if count >= MAX_EMERGENCY_CONTACTS {
            return Err(AppError::BadRequest(format!(
                "You can have at most {} emergency contacts",
                MAX_EMERGENCY_CONTACTS
            )));
        }
        if repo
            .phone_taken(params.user_id, &params.phone_number, None)
            .await?
        {
            return Err(AppError::Conflict(
                "This phone number is already an emergency contact".to_string(),
            ));
        }

        let contact = repo.create_contact(params, count == 0).await?;
        txn.commit().await?;

        Ok(contact)
    }

    /// Gets the user's contacts, primary first.
    pub async fn get_contacts(&self, user_id: i32) -> Result<Vec<EmergencyContact>, AppError> {
        Ok(EmergencyRepository::new(self.db)
            .get_contacts(user_id)
            .await?)
    }

    pub async fn update_contact(
        &self,
        user_id: i32,
        contact_id: i32,
        mut params: UpdateEmergencyContactParams,
    ) -> Result<EmergencyContact, AppError> {
        let repo = EmergencyRepository::new(self.db);
        let contact = self.owned_contact(user_id, contact_id).await?;

        if params.name.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::BadRequest("Contact name is required".to_string()));
        }
        if let Some(phone) = params.phone_number.take() {
            let phone = validate_phone(&phone)?;
            if repo.phone_taken(user_id, &phone, Some(contact.id)).await? {
                return Err(AppError::Conflict(
                    "This phone number is already an emergency contact".to_string(),
                ));
            }
            params.phone_number = Some(phone);
        }

        Ok(repo.update_contact(contact.id, params).await?)
    }

    /// Deletes a contact, promoting the oldest remaining contact when the primary goes.
    pub async fn delete_contact(&self, user_id: i32, contact_id: i32) -> Result<(), AppError> {
        let contact = self.owned_contact(user_id, contact_id).await?;

        let txn = self.db.begin().await?;
        let repo = EmergencyRepository::new(&txn);

        repo.delete_contact(contact.id).await?;
        if contact.is_primary {
            if let Some(next) = repo
                .get_contacts(user_id)
                .await?
                .into_iter()
                .min_by_key(|contact| contact.id)
            {
                repo.set_primary(user_id, next.id).await?;
            }
        }

        txn.commit().await?;

        Ok(())
    }

    /// Makes the contact the user's only primary contact.
    pub async fn set_primary(
        &self,
        user_id: i32,
        contact_id: i32,
    ) -> Result<EmergencyContact, AppError> {
        let contact = self.owned_contact(user_id, contact_id).await?;

        let txn = self.db.begin().await?;
        EmergencyRepository::new(&txn)
            .set_primary(user_id, contact.id)
            .await?;
        txn.commit().await?;

        self.owned_contact(user_id, contact_id).await
    }

    /// Raises an alert and escalates it.
    ///
    /// # Arguments
    /// - `user` - User raising the alert
    /// - `params` - Type, optional trip, description and location
    ///
    /// # Returns
    /// - `Ok(EmergencyAlert)` - Stored alert with `contacts_notified` set
    /// - `Err(AppError::NotFound)` - Referenced trip does not exist
    /// - `Err(AppError::Forbidden)` - User is not on the referenced trip
    pub async fn create_alert(
        &self,
        user: &User,
        params: CreateEmergencyAlertParams,
    ) -> Result<EmergencyAlert, AppError> {
        let txn = self.db.begin().await?;
        let repo = EmergencyRepository::new(&txn);
        let notifications = NotificationService::new(&txn);

        let trip_participants = match params.trip_id {
            Some(trip_id) => {
                let participants = trip_participants(&txn, trip_id).await?;
                if !participants.contains(&user.id) {
                    return Err(AppError::Forbidden(
                        "You are not a participant of this trip".to_string(),
                    ));
                }
                participants
            }
            None => Vec::new(),
        };

        let alert = repo.create_alert(params).await?;

        let label = type_label(alert.emergency_type);
        let mut content = format!(
            "AutoPort {} alert from {} ({})",
            label,
            user.display_name(),
            user.phone_number
        );
        if let Some(location) = alert.location_text() {
            content.push_str(&format!(". Location: {}", location));
        }
        if let Some(description) = &alert.description {
            content.push_str(&format!(". {}", description));
        }
        let event = NotificationEvent::new(
            NotificationKind::EmergencyAlert,
            format!("Emergency: {}", label),
            content,
        )
        .with_data(json!({ "alert_id": alert.id, "user_id": user.id }));

        let contacts = repo.get_contacts(user.id).await?;
        for contact in &contacts {
            notifications
                .notify_phone(user.id, &contact.phone_number, &event)
                .await?;
        }
        repo.set_contacts_notified(alert.id, contacts.len() as i32)
            .await?;

        if escalates_to_admins(alert.emergency_type) {
            let admins: Vec<i32> = UserRepository::new(&txn)
                .get_active_admins()
                .await?
                .into_iter()
                .map(|admin| admin.id)
                .filter(|&id| id != user.id)
                .collect();
            notifications.notify(&admins, &event).await?;
        }

        let others: Vec<i32> = trip_participants
            .into_iter()
            .filter(|&id| id != user.id)
            .collect();
        notifications.notify(&others, &event).await?;

        let alert = repo
            .find_alert(alert.id)
            .await?
            .ok_or_else(|| AppError::InternalError(format!("Alert {} vanished", alert.id)))?;
        txn.commit().await?;

        tracing::warn!(
            "Emergency alert {} ({}) raised by user {}, {} contact(s) notified",
            alert.id,
            label,
            user.id,
            contacts.len()
        );

        Ok(alert)
    }

    /// Gets the user's alerts, newest first.
    pub async fn get_my_alerts(&self, user_id: i32) -> Result<Vec<EmergencyAlert>, AppError> {
        Ok(EmergencyRepository::new(self.db)
            .get_alerts_by_user(user_id)
            .await?)
    }

    /// Gets an alert visible to its owner and to administrators.
    pub async fn get_alert(
        &self,
        user: &User,
        alert_id: i32,
    ) -> Result<EmergencyAlert, AppError> {
        let alert = EmergencyRepository::new(self.db)
            .find_alert(alert_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))?;

        if alert.user_id != user.id && user.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "You cannot view this alert".to_string(),
            ));
        }

        Ok(alert)
    }

    /// Resolves an alert and tells the owner's contacts that the situation is over.
    ///
    /// # Returns
    /// - `Ok(EmergencyAlert)` - The resolved alert
    /// - `Err(AppError::Forbidden)` - Caller is neither the owner nor an admin
    /// - `Err(AppError::Conflict)` - Alert already resolved
    pub async fn resolve_alert(
        &self,
        user: &User,
        alert_id: i32,
        note: Option<String>,
    ) -> Result<EmergencyAlert, AppError> {
        let alert = self.get_alert(user, alert_id).await?;
        if alert.is_resolved {
            return Err(AppError::Conflict("Alert is already resolved".to_string()));
        }

        let txn = self.db.begin().await?;
        let repo = EmergencyRepository::new(&txn);

        let resolved = repo
            .resolve_alert(alert.id, user.id, note, Utc::now())
            .await?;

        let owner = UserRepository::new(&txn)
            .find_by_id(alert.user_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!("Owner of alert {} missing", alert.id))
            })?;
        let event = NotificationEvent::new(
            NotificationKind::EmergencyResolved,
            "Emergency resolved",
            format!(
                "AutoPort: the {} alert from {} has been resolved",
                type_label(alert.emergency_type),
                owner.display_name()
            ),
        )
        .with_data(json!({ "alert_id": alert.id }));

        let notifications = NotificationService::new(&txn);
        for contact in repo.get_contacts(owner.id).await? {
            notifications
                .notify_phone(owner.id, &contact.phone_number, &event)
                .await?;
        }

        txn.commit().await?;

        Ok(resolved)
    }

    /// Every unresolved alert, oldest first.
    pub async fn get_unresolved(&self) -> Result<Vec<EmergencyAlert>, AppError> {
        Ok(EmergencyRepository::new(self.db).get_unresolved().await?)
    }

    async fn owned_contact(
        &self,
        user_id: i32,
        contact_id: i32,
    ) -> Result<EmergencyContact, AppError> {
        EmergencyRepository::new(self.db)
            .find_contact(user_id, contact_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Emergency contact not found".to_string()))
    }
}

/// Driver followed by confirmed passengers of a trip.
async fn trip_participants<C: ConnectionTrait>(
    db: &C,
    trip_id: i32,
) -> Result<Vec<i32>, AppError> {
    let trip = TripRepository::new(db)
        .find_by_id(trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    let mut participants = vec![trip.driver_id];
    participants.extend(
        BookingRepository::new(db)
            .get_confirmed_by_trip(trip.id)
            .await?
            .into_iter()
            .map(|booking| booking.passenger_id),
    );

    Ok(participants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sos_and_harassment_reach_admins() {
        assert!(escalates_to_admins(EmergencyType::Sos));
        assert!(escalates_to_admins(EmergencyType::Harassment));
        assert!(!escalates_to_admins(EmergencyType::Accident));
        assert!(!escalates_to_admins(EmergencyType::Breakdown));
        assert!(!escalates_to_admins(EmergencyType::Other));
    }
}
