use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000001_create_user_table::User,
    m20260105_000012_create_message_thread_table::MessageThread,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ThreadParticipant::Table)
                    .if_not_exists()
                    .col(pk_auto(ThreadParticipant::Id))
                    .col(integer(ThreadParticipant::ThreadId))
                    .col(integer(ThreadParticipant::UserId))
                    .col(timestamp_with_time_zone_null(ThreadParticipant::LastReadAt))
                    .col(
                        timestamp_with_time_zone(ThreadParticipant::JoinedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_thread_participant_thread_id")
                            .from(ThreadParticipant::Table, ThreadParticipant::ThreadId)
                            .to(MessageThread::Table, MessageThread::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_thread_participant_user_id")
                            .from(ThreadParticipant::Table, ThreadParticipant::UserId)
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
                    .name("idx_thread_participant_thread_user")
                    .table(ThreadParticipant::Table)
                    .col(ThreadParticipant::ThreadId)
                    .col(ThreadParticipant::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ThreadParticipant::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ThreadParticipant {
    Table,
    Id,
    ThreadId,
    UserId,
    LastReadAt,
    JoinedAt,
}
