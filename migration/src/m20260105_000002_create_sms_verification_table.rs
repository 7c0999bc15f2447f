use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SmsVerification::Table)
                    .if_not_exists()
                    .col(pk_auto(SmsVerification::Id))
                    .col(string_len(SmsVerification::PhoneNumber, 16))
                    .col(string_len(SmsVerification::Code, 8))
                    .col(timestamp_with_time_zone(SmsVerification::ExpiresAt))
                    .col(boolean(SmsVerification::IsUsed).default(false))
                    .col(integer(SmsVerification::Attempts).default(0))
                    .col(
                        timestamp_with_time_zone(SmsVerification::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sms_verification_phone_number")
                    .table(SmsVerification::Table)
                    .col(SmsVerification::PhoneNumber)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SmsVerification::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SmsVerification {
    Table,
    Id,
    PhoneNumber,
    Code,
    ExpiresAt,
    IsUsed,
    Attempts,
    CreatedAt,
}
