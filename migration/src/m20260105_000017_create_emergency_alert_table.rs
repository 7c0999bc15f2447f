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
                    .table(EmergencyAlert::Table)
                    .if_not_exists()
                    .col(pk_auto(EmergencyAlert::Id))
                    .col(integer(EmergencyAlert::UserId))
                    .col(integer_null(EmergencyAlert::TripId))
                    .col(string_len(EmergencyAlert::EmergencyType, 16))
                    .col(text_null(EmergencyAlert::Description))
                    .col(decimal_len_null(EmergencyAlert::LocationLat, 10, 7))
                    .col(decimal_len_null(EmergencyAlert::LocationLng, 10, 7))
                    .col(string_len_null(EmergencyAlert::LocationAddress, 255))
                    .col(boolean(EmergencyAlert::IsResolved).default(false))
                    .col(timestamp_with_time_zone_null(EmergencyAlert::ResolvedAt))
                    .col(integer_null(EmergencyAlert::ResolvedBy))
                    .col(text_null(EmergencyAlert::ResolutionNote))
                    .col(integer(EmergencyAlert::ContactsNotified).default(0))
                    .col(
                        timestamp_with_time_zone(EmergencyAlert::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emergency_alert_user_id")
                            .from(EmergencyAlert::Table, EmergencyAlert::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emergency_alert_trip_id")
                            .from(EmergencyAlert::Table, EmergencyAlert::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmergencyAlert::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum EmergencyAlert {
    Table,
    Id,
    UserId,
    TripId,
    EmergencyType,
    Description,
    LocationLat,
    LocationLng,
    LocationAddress,
    IsResolved,
    ResolvedAt,
    ResolvedBy,
    ResolutionNote,
    ContactsNotified,
    CreatedAt,
}
