use sea_orm_migration::{prelude::*, schema::*};

use super::{m20260105_000001_create_user_table::User, m20260105_000003_create_car_table::Car};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(pk_auto(Trip::Id))
                    .col(integer(Trip::DriverId))
                    .col(integer(Trip::CarId))
                    .col(string_len(Trip::FromLocation, 255))
                    .col(string_len(Trip::ToLocation, 255))
                    .col(timestamp_with_time_zone(Trip::DepartureDatetime))
                    .col(timestamp_with_time_zone_null(Trip::EstimatedArrivalDatetime))
                    .col(decimal_len(Trip::PricePerSeat, 12, 2))
                    .col(integer(Trip::TotalSeatsOffered))
                    .col(integer(Trip::AvailableSeats))
                    .col(string_len(Trip::Status, 32).default("scheduled"))
                    .col(text_null(Trip::AdditionalInfo))
                    .col(boolean(Trip::IsInstantBooking).default(true))
                    .col(boolean(Trip::PriceNegotiable).default(false))
                    .col(boolean(Trip::AllowSmoking).default(false))
                    .col(boolean(Trip::AllowPets).default(false))
                    .col(boolean(Trip::AllowMusic).default(true))
                    .col(boolean(Trip::FemaleOnly).default(false))
                    .col(timestamp_with_time_zone(Trip::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Trip::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_driver_id")
                            .from(Trip::Table, Trip::DriverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_car_id")
                            .from(Trip::Table, Trip::CarId)
                            .to(Car::Table, Car::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_status_departure")
                    .table(Trip::Table)
                    .col(Trip::Status)
                    .col(Trip::DepartureDatetime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trip {
    Table,
    Id,
    DriverId,
    CarId,
    FromLocation,
    ToLocation,
    DepartureDatetime,
    EstimatedArrivalDatetime,
    PricePerSeat,
    TotalSeatsOffered,
    AvailableSeats,
    Status,
    AdditionalInfo,
    IsInstantBooking,
    PriceNegotiable,
    AllowSmoking,
    AllowPets,
    AllowMusic,
    FemaleOnly,
    CreatedAt,
    UpdatedAt,
}
