//! Travel preference and notification settings domain models.

use entity::sea_orm_active_enums::{ComfortLevel, Gender, HabitPreference};
use rust_decimal::Decimal;

use crate::model::preference::{
    CompatibilityDto, TravelPreferenceDto, UpdateUserSettingsDto, UserSettingsDto,
};

/// Per-user notification and privacy switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserSettings {
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub email_notifications: bool,
    pub profile_visible: bool,
    pub show_phone_to_confirmed: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            sms_notifications: true,
            push_notifications: true,
            email_notifications: false,
            profile_visible: true,
            show_phone_to_confirmed: true,
        }
    }
}

impl UserSettings {
    pub fn from_entity(entity: entity::user_settings::Model) -> Self {
        Self {
            sms_notifications: entity.sms_notifications,
            push_notifications: entity.push_notifications,
            email_notifications: entity.email_notifications,
            profile_visible: entity.profile_visible,
            show_phone_to_confirmed: entity.show_phone_to_confirmed,
        }
    }

    /// Applies a partial update on top of the current values.
    pub fn apply(self, dto: UpdateUserSettingsDto) -> Self {
        Self {
            sms_notifications: dto.sms_notifications.unwrap_or(self.sms_notifications),
            push_notifications: dto.push_notifications.unwrap_or(self.push_notifications),
            email_notifications: dto.email_notifications.unwrap_or(self.email_notifications),
            profile_visible: dto.profile_visible.unwrap_or(self.profile_visible),
            show_phone_to_confirmed: dto
                .show_phone_to_confirmed
                .unwrap_or(self.show_phone_to_confirmed),
        }
    }

    pub fn into_dto(self) -> UserSettingsDto {
        UserSettingsDto {
            sms_notifications: self.sms_notifications,
            push_notifications: self.push_notifications,
            email_notifications: self.email_notifications,
            profile_visible: self.profile_visible,
            show_phone_to_confirmed: self.show_phone_to_confirmed,
        }
    }
}

/// Habits and limits a user travels with.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelPreference {
    pub smoking: HabitPreference,
    pub pets: HabitPreference,
    pub music: HabitPreference,
    pub talking: HabitPreference,
    pub preferred_gender: Option<Gender>,
    pub comfort_level: Option<ComfortLevel>,
    pub max_price_per_seat: Option<Decimal>,
}

impl Default for TravelPreference {
    fn default() -> Self {
        Self {
            smoking: HabitPreference::NoPreference,
            pets: HabitPreference::NoPreference,
            music: HabitPreference::NoPreference,
            talking: HabitPreference::NoPreference,
            preferred_gender: None,
            comfort_level: None,
            max_price_per_seat: None,
        }
    }
}

impl TravelPreference {
    pub fn from_entity(entity: entity::travel_preference::Model) -> Self {
        Self {
            smoking: entity.smoking,
            pets: entity.pets,
            music: entity.music,
            talking: entity.talking,
            preferred_gender: entity.preferred_gender,
            comfort_level: entity.comfort_level,
            max_price_per_seat: entity.max_price_per_seat,
        }
    }

    pub fn from_dto(dto: TravelPreferenceDto) -> Self {
        Self {
            smoking: dto.smoking,
            pets: dto.pets,
            music: dto.music,
            talking: dto.talking,
            preferred_gender: dto.preferred_gender,
            comfort_level: dto.comfort_level,
            max_price_per_seat: dto.max_price_per_seat,
        }
    }

    pub fn into_dto(self) -> TravelPreferenceDto {
        TravelPreferenceDto {
            smoking: self.smoking,
            pets: self.pets,
            music: self.music,
            talking: self.talking,
            preferred_gender: self.preferred_gender,
            comfort_level: self.comfort_level,
            max_price_per_seat: self.max_price_per_seat,
        }
    }
}

/// Compatibility between two users, computed from their travel preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compatibility {
    pub user_id: i32,
    pub other_user_id: i32,
    /// 0..=100
    pub score: i32,
    pub is_compatible: bool,
}

impl Compatibility {
    pub fn into_dto(self) -> CompatibilityDto {
        CompatibilityDto {
            user_id: self.user_id,
            other_user_id: self.other_user_id,
            score: self.score,
            is_compatible: self.is_compatible,
        }
    }
}
