use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::EmergencyType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmergencyContactDto {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
    pub relationship: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEmergencyContactDto {
    pub name: String,
    pub phone_number: String,
    pub relationship: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEmergencyContactDto {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmergencyAlertDto {
    pub id: i32,
    pub user_id: i32,
    pub trip_id: Option<i32>,
    pub emergency_type: EmergencyType,
    pub description: Option<String>,
    pub location_lat: Option<Decimal>,
    pub location_lng: Option<Decimal>,
    pub location_address: Option<String>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i32>,
    pub resolution_note: Option<String>,
    pub contacts_notified: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEmergencyAlertDto {
    pub emergency_type: EmergencyType,
    pub trip_id: Option<i32>,
    pub description: Option<String>,
    pub location_lat: Option<Decimal>,
    pub location_lng: Option<Decimal>,
    pub location_address: Option<String>,
}

/// One-tap SOS, optionally with the current position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QuickSosDto {
    pub trip_id: Option<i32>,
    pub location_lat: Option<Decimal>,
    pub location_lng: Option<Decimal>,
    pub location_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ResolveAlertDto {
    pub resolution_note: Option<String>,
}
