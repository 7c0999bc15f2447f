use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000004_create_trip_table::Trip;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MessageThread::Table)
                    .if_not_exists()
                    .col(pk_auto(MessageThread::Id))
                    .col(integer_null(MessageThread::TripId).unique_key())
                    .col(string_len_null(MessageThread::Subject, 255))
                    .col(timestamp_with_time_zone_null(MessageThread::LastMessageAt))
                    .col(
                        timestamp_with_time_zone(MessageThread::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_thread_trip_id")
                            .from(MessageThread::Table, MessageThread::TripId)
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
            .drop_table(Table::drop().table(MessageThread::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MessageThread {
    Table,
    Id,
    TripId,
    Subject,
    LastMessageAt,
    CreatedAt,
}
