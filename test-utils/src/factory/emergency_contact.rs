//! Emergency contact factory.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct EmergencyContactFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
    name: String,
    phone_number: String,
    is_primary: bool,
}

impl<'a> EmergencyContactFactory<'a> {
    /// Creates a new factory for a non-primary contact with a unique `+99891` phone.
    pub fn new(db: &'a DatabaseConnection, user_id: i32) -> Self {
        let id = next_id();
        Self {
            db,
            user_id,
            name: format!("Contact {}", id),
            phone_number: format!("+99891{:07}", id),
            is_primary: false,
        }
    }

    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = phone_number.into();
        self
    }

    pub fn is_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    /// Builds and inserts the contact entity into the database.
    pub async fn build(self) -> Result<entity::emergency_contact::Model, DbErr> {
        let now = Utc::now();
        entity::emergency_contact::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            name: ActiveValue::Set(self.name),
            phone_number: ActiveValue::Set(self.phone_number),
            relationship: ActiveValue::Set("family".to_string()),
            is_primary: ActiveValue::Set(self.is_primary),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a non-primary emergency contact for `user_id`.
pub async fn create_emergency_contact(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<entity::emergency_contact::Model, DbErr> {
    EmergencyContactFactory::new(db, user_id).build().await
}
