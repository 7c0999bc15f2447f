//! Repository for user settings and travel preferences.
//!
//! Both tables hold at most one row per user. Reads fall back to defaults when the row
//! is missing and writes create it on first use.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter,
};

use crate::server::model::preference::{TravelPreference, UserSettings};

pub struct PreferenceRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PreferenceRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Gets a user's settings, defaults when none are stored.
    pub async fn get_settings(&self, user_id: i32) -> Result<UserSettings, DbErr> {
        let settings = entity::prelude::UserSettings::find()
            .filter(entity::user_settings::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        Ok(settings
            .map(UserSettings::from_entity)
            .unwrap_or_default())
    }

    pub async fn save_settings(
        &self,
        user_id: i32,
        settings: UserSettings,
    ) -> Result<UserSettings, DbErr> {
        let now = Utc::now();
        let existing = entity::prelude::UserSettings::find()
            .filter(entity::user_settings::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        let entity = match existing {
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.sms_notifications = ActiveValue::Set(settings.sms_notifications);
                active.push_notifications = ActiveValue::Set(settings.push_notifications);
                active.email_notifications = ActiveValue::Set(settings.email_notifications);
                active.profile_visible = ActiveValue::Set(settings.profile_visible);
                active.show_phone_to_confirmed =
                    ActiveValue::Set(settings.show_phone_to_confirmed);
                active.updated_at = ActiveValue::Set(now);
                active.update(self.db).await?
            }
            None => {
                entity::user_settings::ActiveModel {
                    user_id: ActiveValue::Set(user_id),
                    sms_notifications: ActiveValue::Set(settings.sms_notifications),
                    push_notifications: ActiveValue::Set(settings.push_notifications),
                    email_notifications: ActiveValue::Set(settings.email_notifications),
                    profile_visible: ActiveValue::Set(settings.profile_visible),
                    show_phone_to_confirmed: ActiveValue::Set(settings.show_phone_to_confirmed),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        Ok(UserSettings::from_entity(entity))
    }

    /// Gets a user's travel preferences, `None` when never set.
    pub async fn get_travel_preference(
        &self,
        user_id: i32,
    ) -> Result<Option<TravelPreference>, DbErr> {
        let preference = entity::prelude::TravelPreference::find()
            .filter(entity::travel_preference::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        Ok(preference.map(TravelPreference::from_entity))
    }

    pub async fn save_travel_preference(
        &self,
        user_id: i32,
        preference: TravelPreference,
    ) -> Result<TravelPreference, DbErr> {
        let now = Utc::now();
        let existing = entity::prelude::TravelPreference::find()
            .filter(entity::travel_preference::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        let entity = match existing {
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.smoking = ActiveValue::Set(preference.smoking);
                active.pets = ActiveValue::Set(preference.pets);
                active.music = ActiveValue::Set(preference.music);
                active.talking = ActiveValue::Set(preference.talking);
                active.preferred_gender = ActiveValue::Set(preference.preferred_gender);
                active.comfort_level = ActiveValue::Set(preference.comfort_level);
                active.max_price_per_seat = ActiveValue::Set(preference.max_price_per_seat);
                active.updated_at = ActiveValue::Set(now);
                active.update(self.db).await?
            }
            None => {
                entity::travel_preference::ActiveModel {
                    user_id: ActiveValue::Set(user_id),
                    smoking: ActiveValue::Set(preference.smoking),
                    pets: ActiveValue::Set(preference.pets),
                    music: ActiveValue::Set(preference.music),
                    talking: ActiveValue::Set(preference.talking),
                    preferred_gender: ActiveValue::Set(preference.preferred_gender),
                    comfort_level: ActiveValue::Set(preference.comfort_level),
                    max_price_per_seat: ActiveValue::Set(preference.max_price_per_seat),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        Ok(TravelPreference::from_entity(entity))
    }
}
