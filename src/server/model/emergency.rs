//! Emergency contact and alert domain models.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::EmergencyType;
use rust_decimal::Decimal;

use crate::model::emergency::{
    CreateEmergencyAlertDto, CreateEmergencyContactDto, EmergencyAlertDto, EmergencyContactDto,
    QuickSosDto, UpdateEmergencyContactDto,
};

/// Most emergency contacts a user may register.
pub const MAX_EMERGENCY_CONTACTS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyContact {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub phone_number: String,
    pub relationship: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl EmergencyContact {
    pub fn from_entity(entity: entity::emergency_contact::Model) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            name: entity.name,
            phone_number: entity.phone_number,
            relationship: entity.relationship,
            is_primary: entity.is_primary,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> EmergencyContactDto {
        EmergencyContactDto {
            id: self.id,
            name: self.name,
            phone_number: self.phone_number,
            relationship: self.relationship,
            is_primary: self.is_primary,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateEmergencyContactParams {
    pub user_id: i32,
    pub name: String,
    pub phone_number: String,
    pub relationship: String,
}

impl CreateEmergencyContactParams {
    pub fn from_dto(user_id: i32, dto: CreateEmergencyContactDto) -> Self {
        Self {
            user_id,
            name: dto.name.trim().to_string(),
            phone_number: dto.phone_number,
            relationship: dto.relationship.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateEmergencyContactParams {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub relationship: Option<String>,
}

impl UpdateEmergencyContactParams {
    pub fn from_dto(dto: UpdateEmergencyContactDto) -> Self {
        Self {
            name: dto.name.map(|name| name.trim().to_string()),
            phone_number: dto.phone_number,
            relationship: dto.relationship.map(|value| value.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyAlert {
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
    /// Emergency contacts an SMS was enqueued for
    pub contacts_notified: i32,
    pub created_at: DateTime<Utc>,
}

impl EmergencyAlert {
    pub fn from_entity(entity: entity::emergency_alert::Model) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            trip_id: entity.trip_id,
            emergency_type: entity.emergency_type,
            description: entity.description,
            location_lat: entity.location_lat,
            location_lng: entity.location_lng,
            location_address: entity.location_address,
            is_resolved: entity.is_resolved,
            resolved_at: entity.resolved_at,
            resolved_by: entity.resolved_by,
            resolution_note: entity.resolution_note,
            contacts_notified: entity.contacts_notified,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> EmergencyAlertDto {
        EmergencyAlertDto {
            id: self.id,
            user_id: self.user_id,
            trip_id: self.trip_id,
            emergency_type: self.emergency_type,
            description: self.description,
            location_lat: self.location_lat,
            location_lng: self.location_lng,
            location_address: self.location_address,
            is_resolved: self.is_resolved,
            resolved_at: self.resolved_at,
            resolved_by: self.resolved_by,
            resolution_note: self.resolution_note,
            contacts_notified: self.contacts_notified,
            created_at: self.created_at,
        }
    }

    /// Human readable location for SMS texts, coordinates when no address was given.
    pub fn location_text(&self) -> Option<String> {
        if let Some(address) = &self.location_address {
            return Some(address.clone());
        }
        match (self.location_lat, self.location_lng) {
            (Some(lat), Some(lng)) => Some(format!("https://maps.google.com/?q={lat},{lng}")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateEmergencyAlertParams {
    pub user_id: i32,
    pub trip_id: Option<i32>,
    pub emergency_type: EmergencyType,
    pub description: Option<String>,
    pub location_lat: Option<Decimal>,
    pub location_lng: Option<Decimal>,
    pub location_address: Option<String>,
}

impl CreateEmergencyAlertParams {
    pub fn from_dto(user_id: i32, dto: CreateEmergencyAlertDto) -> Self {
        Self {
            user_id,
            trip_id: dto.trip_id,
            emergency_type: dto.emergency_type,
            description: dto.description,
            location_lat: dto.location_lat,
            location_lng: dto.location_lng,
            location_address: dto.location_address,
        }
    }

    pub fn quick_sos(user_id: i32, dto: QuickSosDto) -> Self {
        Self {
            user_id,
            trip_id: dto.trip_id,
            emergency_type: EmergencyType::Sos,
            description: Some("Quick SOS triggered".to_string()),
            location_lat: dto.location_lat,
            location_lng: dto.location_lng,
            location_address: dto.location_address,
        }
    }
}
