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
                    .table(PriceNegotiation::Table)
                    .if_not_exists()
                    .col(pk_auto(PriceNegotiation::Id))
                    .col(integer(PriceNegotiation::TripId))
                    .col(integer(PriceNegotiation::PassengerId))
                    .col(integer(PriceNegotiation::DriverId))
                    .col(integer(PriceNegotiation::SeatsRequested).default(1))
                    .col(decimal_len(PriceNegotiation::OriginalPrice, 12, 2))
                    .col(decimal_len_null(PriceNegotiation::FinalPrice, 12, 2))
                    .col(string_len(PriceNegotiation::Status, 16).default("open"))
                    .col(integer_null(PriceNegotiation::HeadOfferId))
                    .col(integer_null(PriceNegotiation::BookingId))
                    .col(timestamp_with_time_zone(PriceNegotiation::ExpiresAt))
                    .col(timestamp_with_time_zone_null(PriceNegotiation::ResolvedAt))
                    .col(
                        timestamp_with_time_zone(PriceNegotiation::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(PriceNegotiation::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_negotiation_trip_id")
                            .from(PriceNegotiation::Table, PriceNegotiation::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_negotiation_passenger_id")
                            .from(PriceNegotiation::Table, PriceNegotiation::PassengerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_negotiation_driver_id")
                            .from(PriceNegotiation::Table, PriceNegotiation::DriverId)
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
                    .name("idx_price_negotiation_status_expires_at")
                    .table(PriceNegotiation::Table)
                    .col(PriceNegotiation::Status)
                    .col(PriceNegotiation::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // One unresolved chain per passenger and trip.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_price_negotiation_unresolved \
                 ON price_negotiation (trip_id, passenger_id) \
                 WHERE status IN ('open', 'countered')",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceNegotiation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PriceNegotiation {
    Table,
    Id,
    TripId,
    PassengerId,
    DriverId,
    SeatsRequested,
    OriginalPrice,
    FinalPrice,
    Status,
    HeadOfferId,
    BookingId,
    ExpiresAt,
    ResolvedAt,
    CreatedAt,
    UpdatedAt,
}
