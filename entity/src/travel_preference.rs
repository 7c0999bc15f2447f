use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::{ComfortLevel, Gender, HabitPreference};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "travel_preference")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub smoking: HabitPreference,
    pub pets: HabitPreference,
    pub music: HabitPreference,
    pub talking: HabitPreference,
    pub preferred_gender: Option<Gender>,
    pub comfort_level: Option<ComfortLevel>,
    pub max_price_per_seat: Option<Decimal>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
