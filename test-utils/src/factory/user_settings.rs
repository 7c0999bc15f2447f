//! User settings factory.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for a user's notification settings, starting from the application defaults.
pub struct UserSettingsFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
    sms_notifications: bool,
    push_notifications: bool,
    email_notifications: bool,
}

impl<'a> UserSettingsFactory<'a> {
    /// Defaults: SMS and push enabled, email disabled.
    pub fn new(db: &'a DatabaseConnection, user_id: i32) -> Self {
        Self {
            db,
            user_id,
            sms_notifications: true,
            push_notifications: true,
            email_notifications: false,
        }
    }

    pub fn sms(mut self, enabled: bool) -> Self {
        self.sms_notifications = enabled;
        self
    }

    pub fn push(mut self, enabled: bool) -> Self {
        self.push_notifications = enabled;
        self
    }

    pub fn email(mut self, enabled: bool) -> Self {
        self.email_notifications = enabled;
        self
    }

    /// Builds and inserts the settings entity into the database.
    pub async fn build(self) -> Result<entity::user_settings::Model, DbErr> {
        entity::user_settings::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            sms_notifications: ActiveValue::Set(self.sms_notifications),
            push_notifications: ActiveValue::Set(self.push_notifications),
            email_notifications: ActiveValue::Set(self.email_notifications),
            profile_visible: ActiveValue::Set(true),
            show_phone_to_confirmed: ActiveValue::Set(true),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}
