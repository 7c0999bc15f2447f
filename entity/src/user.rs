use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::{Gender, UserRole, UserStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub phone_number: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub role: UserRole,
    pub status: UserStatus,
    pub preferred_language: String,
    pub is_phone_verified: bool,
    pub push_token: Option<String>,
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::car::Entity")]
    Car,
    #[sea_orm(has_one = "super::user_settings::Entity")]
    UserSettings,
    #[sea_orm(has_one = "super::travel_preference::Entity")]
    TravelPreference,
    #[sea_orm(has_many = "super::emergency_contact::Entity")]
    EmergencyContact,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl Related<super::user_settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSettings.def()
    }
}

impl Related<super::travel_preference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TravelPreference.def()
    }
}

impl Related<super::emergency_contact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmergencyContact.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
