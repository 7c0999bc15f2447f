use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::RatingType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rating")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub trip_id: i32,
    pub booking_id: Option<i32>,
    pub rater_id: i32,
    pub rated_user_id: i32,
    pub rating_type: RatingType,
    pub score: i32,
    pub review: Option<String>,
    pub punctuality: Option<i32>,
    pub cleanliness: Option<i32>,
    pub communication: Option<i32>,
    pub driving_quality: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Trip,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RaterId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Rater,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RatedUserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    RatedUser,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
