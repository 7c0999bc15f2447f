use entity::sea_orm_active_enums::{ComfortLevel, Gender, HabitPreference};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TravelPreferenceDto {
    pub smoking: HabitPreference,
    pub pets: HabitPreference,
    pub music: HabitPreference,
    pub talking: HabitPreference,
    pub preferred_gender: Option<Gender>,
    pub comfort_level: Option<ComfortLevel>,
    pub max_price_per_seat: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSettingsDto {
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub email_notifications: bool,
    pub profile_visible: bool,
    pub show_phone_to_confirmed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserSettingsDto {
    pub sms_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub email_notifications: Option<bool>,
    pub profile_visible: Option<bool>,
    pub show_phone_to_confirmed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompatibilityDto {
    pub user_id: i32,
    pub other_user_id: i32,
    pub score: i32,
    pub is_compatible: bool,
}
