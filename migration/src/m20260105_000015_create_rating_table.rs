use sea_orm_migration::{prelude::*, schema::*};

use super::{m20260105_000001_create_user_table::User, m20260105_000004_create_trip_table::Trip};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(pk_auto(Rating::Id))
                    .col(integer(Rating::TripId))
                    .col(integer_null(Rating::BookingId))
                    .col(integer(Rating::RaterId))
                    .col(integer(Rating::RatedUserId))
                    .col(string_len(Rating::RatingType, 32))
                    .col(integer(Rating::Score))
                    .col(text_null(Rating::Review))
                    .col(integer_null(Rating::Punctuality))
                    .col(integer_null(Rating::Cleanliness))
                    .col(integer_null(Rating::Communication))
                    .col(integer_null(Rating::DrivingQuality))
                    .col(
                        timestamp_with_time_zone(Rating::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_trip_id")
                            .from(Rating::Table, Rating::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_rater_id")
                            .from(Rating::Table, Rating::RaterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_rated_user_id")
                            .from(Rating::Table, Rating::RatedUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rating_trip_rater_rated_user")
                    .table(Rating::Table)
                    .col(Rating::TripId)
                    .col(Rating::RaterId)
                    .col(Rating::RatedUserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rating::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Rating {
    Table,
    Id,
    TripId,
    BookingId,
    RaterId,
    RatedUserId,
    RatingType,
    Score,
    Review,
    Punctuality,
    Cleanliness,
    Communication,
    DrivingQuality,
    CreatedAt,
}
