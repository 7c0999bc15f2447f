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
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(pk_auto(Notification::Id))
                    .col(integer(Notification::UserId))
                    .col(string_len(Notification::Channel, 16))
                    .col(string_len(Notification::Status, 16).default("pending"))
                    .col(string_len(Notification::Kind, 64))
                    .col(string_len(Notification::Title, 200))
                    .col(text(Notification::Content))
                    .col(json_null(Notification::Data))
                    .col(string_len_null(Notification::PhoneNumber, 16))
                    .col(boolean(Notification::IsRead).default(false))
                    .col(integer(Notification::Attempts).default(0))
                    .col(text_null(Notification::LastError))
                    .col(timestamp_with_time_zone(Notification::ScheduledAt))
                    .col(timestamp_with_time_zone_null(Notification::SentAt))
                    .col(timestamp_with_time_zone_null(Notification::ReadAt))
                    .col(
                        timestamp_with_time_zone(Notification::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_user_id")
                            .from(Notification::Table, Notification::UserId)
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
                    .name("idx_notification_status_scheduled_at")
                    .table(Notification::Table)
                    .col(Notification::Status)
                    .col(Notification::ScheduledAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Notification {
    Table,
    Id,
    UserId,
    Channel,
    Status,
    Kind,
    Title,
    Content,
    Data,
    PhoneNumber,
    IsRead,
    Attempts,
    LastError,
    ScheduledAt,
    SentAt,
    ReadAt,
    CreatedAt,
}
