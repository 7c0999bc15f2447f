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
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(pk_auto(Booking::Id))
                    .col(integer(Booking::TripId))
                    .col(integer(Booking::PassengerId))
                    .col(integer(Booking::SeatsBooked))
                    .col(decimal_len(Booking::TotalPrice, 12, 2))
                    .col(string_len(Booking::Status, 32).default("confirmed"))
                    .col(string_len_null(Booking::PickupLocation, 255))
                    .col(string_len_null(Booking::DropoffLocation, 255))
                    .col(text_null(Booking::SpecialRequests))
                    .col(string_len(Booking::PaymentMethod, 16).default("cash"))
                    .col(integer_null(Booking::NegotiationId))
                    .col(text_null(Booking::CancellationReason))
                    .col(timestamp_with_time_zone(Booking::BookedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Booking::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_trip_id")
                            .from(Booking::Table, Booking::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_passenger_id")
                            .from(Booking::Table, Booking::PassengerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    TripId,
    PassengerId,
    SeatsBooked,
    TotalPrice,
    Status,
    PickupLocation,
    DropoffLocation,
    SpecialRequests,
    PaymentMethod,
    NegotiationId,
    CancellationReason,
    BookedAt,
    UpdatedAt,
}
