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
                    .table(EmergencyContact::Table)
                    .if_not_exists()
                    .col(pk_auto(EmergencyContact::Id))
                    .col(integer(EmergencyContact::UserId))
                    .col(string_len(EmergencyContact::Name, 255))
                    .col(string_len(EmergencyContact::PhoneNumber, 16))
                    .col(string_len(EmergencyContact::Relationship, 64))
                    .col(boolean(EmergencyContact::IsPrimary).default(false))
                    .col(
                        timestamp_with_time_zone(EmergencyContact::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(EmergencyContact::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emergency_contact_user_id")
                            .from(EmergencyContact::Table, EmergencyContact::UserId)
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
                    .name("idx_emergency_contact_user_phone")
                    .table(EmergencyContact::Table)
                    .col(EmergencyContact::UserId)
                    .col(EmergencyContact::PhoneNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmergencyContact::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum EmergencyContact {
    Table,
    Id,
    UserId,
    Name,
    PhoneNumber,
    Relationship,
    IsPrimary,
    CreatedAt,
    UpdatedAt,
}
