//! Emergency contact and alert repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::emergency::{
    CreateEmergencyAlertParams, CreateEmergencyContactParams, EmergencyAlert, EmergencyContact,
    UpdateEmergencyContactParams,
};

pub struct EmergencyRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> EmergencyRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Stores a contact with a validated phone number.
    pub async fn create_contact(
        &self,
        params: CreateEmergencyContactParams,
        is_primary: bool,
    ) -> Result<EmergencyContact, DbErr> {
        let now = Utc::now();
        let entity = entity::emergency_contact::ActiveModel {
            user_id: ActiveValue::Set(params.user_id),
            name: ActiveValue::Set(params.name),
            phone_number: ActiveValue::Set(params.phone_number),
            relationship: ActiveValue::Set(params.relationship),
            is_primary: ActiveValue::Set(is_primary),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(EmergencyContact::from_entity(entity))
    }

    /// Finds a contact owned by `user_id`.
    pub async fn find_contact(
        &self,
        user_id: i32,
        id: i32,
    ) -> Result<Option<EmergencyContact>, DbErr> {
        let entity = entity::prelude::EmergencyContact::find_by_id(id)
            .filter(entity::emergency_contact::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        Ok(entity.map(EmergencyContact::from_entity))
    }

    /// A user's contacts, primary first.
    pub async fn get_contacts(&self, user_id: i32) -> Result<Vec<EmergencyContact>, DbErr> {
        let contacts = entity::prelude::EmergencyContact::find()
            .filter(entity::emergency_contact::Column::UserId.eq(user_id))
            .order_by_desc(entity::emergency_contact::Column::IsPrimary)
            .order_by_asc(entity::emergency_contact::Column::Id)
            .all(self.db)
            .await?;

        Ok(contacts
            .into_iter()
            .map(EmergencyContact::from_entity)
            .collect())
    }

    pub async fn count_contacts(&self, user_id: i32) -> Result<u64, DbErr> {
        entity::prelude::EmergencyContact::find()
            .filter(entity::emergency_contact::Column::UserId.eq(user_id))
            .count(self.db)
            .await
    }

    /// Whether the user already has a contact with this phone, ignoring `except_id`.
    pub async fn phone_taken(
        &self,
        user_id: i32,
        phone_number: &str,
        except_id: Option<i32>,
    ) -> Result<bool, DbErr> {
        let mut query = entity::prelude::EmergencyContact::find()
            .filter(entity::emergency_contact::Column::UserId.eq(user_id))
            .filter(entity::emergency_contact::Column::PhoneNumber.eq(phone_number));
        if let Some(id) = except_id {
            query = query.filter(entity::emergency_contact::Column::Id.ne(id));
        }

        Ok(query.count(self.db).await? > 0)
    }

    pub async fn update_contact(
        &self,
        id: i32,
        params: UpdateEmergencyContactParams,
    ) -> Result<EmergencyContact, DbErr> {
        let contact = entity::prelude::EmergencyContact::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Contact with id {} not found", id)))?;

        let mut contact = contact.into_active_model();
        if let Some(name) = params.name {
            contact.name = ActiveValue::Set(name);
        }
        if let Some(phone_number) = params.phone_number {
            contact.phone_number = ActiveValue::Set(phone_number);
        }
        if let Some(relationship) = params.relationship {
            contact.relationship = ActiveValue::Set(relationship);
        }
        contact.updated_at = ActiveValue::Set(Utc::now());

        Ok(EmergencyContact::from_entity(
            contact.update(self.db).await?,
        ))
    }

    pub async fn delete_contact(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::EmergencyContact::delete_by_id(id)
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Makes `contact_id` the user's only primary contact.
    pub async fn set_primary(&self, user_id: i32, contact_id: i32) -> Result<(), DbErr> {
        entity::prelude::EmergencyContact::update_many()
            .filter(entity::emergency_contact::Column::UserId.eq(user_id))
            .col_expr(
                entity::emergency_contact::Column::IsPrimary,
                sea_orm::sea_query::Expr::value(false),
            )
            .exec(self.db)
            .await?;

        entity::prelude::EmergencyContact::update_many()
            .filter(entity::emergency_contact::Column::Id.eq(contact_id))
            .filter(entity::emergency_contact::Column::UserId.eq(user_id))
            .col_expr(
                entity::emergency_contact::Column::IsPrimary,
                sea_orm::sea_query::Expr::value(true),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub async fn create_alert(
        &self,
        params: CreateEmergencyAlertParams,
    ) -> Result<EmergencyAlert, DbErr> {
        let entity = entity::emergency_alert::ActiveModel {
            user_id: ActiveValue::Set(params.user_id),
            trip_id: ActiveValue::Set(params.trip_id),
            emergency_type: ActiveValue::Set(params.emergency_type),
            description: ActiveValue::Set(params.description),
            location_lat: ActiveValue::Set(params.location_lat),
            location_lng: ActiveValue::Set(params.location_lng),
            location_address: ActiveValue::Set(params.location_address),
            is_resolved: ActiveValue::Set(false),
            resolved_at: ActiveValue::Set(None),
            resolved_by: ActiveValue::Set(None),
            resolution_note: ActiveValue::Set(None),
            contacts_notified: ActiveValue::Set(0),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(EmergencyAlert::from_entity(entity))
    }

    pub async fn set_contacts_notified(&self, id: i32, count: i32) -> Result<(), DbErr> {
        entity::prelude::EmergencyAlert::update_many()
            .filter(entity::emergency_alert::Column::Id.eq(id))
            .col_expr(
                entity::emergency_alert::Column::ContactsNotified,
                sea_orm::sea_query::Expr::value(count),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub async fn find_alert(&self, id: i32) -> Result<Option<EmergencyAlert>, DbErr> {
        let entity = entity::prelude::EmergencyAlert::find_by_id(id)
            .one(self.db)
            .await?;

        Ok(entity.map(EmergencyAlert::from_entity))
    }

    /// A user's alerts, newest first.
    pub async fn get_alerts_by_user(&self, user_id: i32) -> Result<Vec<EmergencyAlert>, DbErr> {
        let alerts = entity::prelude::EmergencyAlert::find()
            .filter(entity::emergency_alert::Column::UserId.eq(user_id))
            .order_by_desc(entity::emergency_alert::Column::CreatedAt)
            .order_by_desc(entity::emergency_alert::Column::Id)
            .all(self.db)
            .await?;

        Ok(alerts.into_iter().map(EmergencyAlert::from_entity).collect())
    }

    /// All unresolved alerts, oldest first for triage.
    pub async fn get_unresolved(&self) -> Result<Vec<EmergencyAlert>, DbErr> {
        let alerts = entity::prelude::EmergencyAlert::find()
            .filter(entity::emergency_alert::Column::IsResolved.eq(false))
            .order_by_asc(entity::emergency_alert::Column::CreatedAt)
            .order_by_asc(entity::emergency_alert::Column::Id)
            .all(self.db)
            .await?;

        Ok(alerts.into_iter().map(EmergencyAlert::from_entity).collect())
    }

    pub async fn resolve_alert(
        &self,
        id: i32,
        resolved_by: i32,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<EmergencyAlert, DbErr> {
        let alert = entity::prelude::EmergencyAlert::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Alert with id {} not found", id)))?;

        let mut alert = alert.into_active_model();
        alert.is_resolved = ActiveValue::Set(true);
        alert.resolved_at = ActiveValue::Set(Some(now));
        alert.resolved_by = ActiveValue::Set(Some(resolved_by));
        alert.resolution_note = ActiveValue::Set(note);

        Ok(EmergencyAlert::from_entity(alert.update(self.db).await?))
    }
}
