use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Car::Table)
                    .if_not_exists()
                    .col(pk_auto(Car::Id))
                    .col(integer(Car::DriverId))
                    .col(string_len(Car::Make, 64))
                    .col(string_len(Car::Model, 64))
                    .col(integer_null(Car::Year))
                    .col(string_len_null(Car::Color, 32))
                    .col(string_len_uniq(Car::LicensePlate, 16))
                    .col(integer(Car::SeatsCount).default(4))
                    .col(string_len(Car::ComfortLevel, 16).default("economy"))
                    .col(string_len(Car::VerificationStatus, 32).default("pending_verification"))
                    .col(text_null(Car::RejectionReason))
                    .col(boolean(Car::IsDefault).default(false))
                    .col(timestamp_with_time_zone(Car::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Car::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_car_driver_id")
                            .from(Car::Table, Car::DriverId)
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
            .drop_table(Table::drop().table(Car::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Car {
    Table,
    Id,
    DriverId,
    Make,
    Model,
    Year,
    Color,
    LicensePlate,
    SeatsCount,
    ComfortLevel,
    VerificationStatus,
    RejectionReason,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}
