use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_len_uniq(User::PhoneNumber, 16))
                    .col(string_len_null(User::FullName, 255))
                    .col(string_len_null(User::Email, 255))
                    .col(string_len_null(User::Gender, 16))
                    .col(string_len(User::Role, 32).default("passenger"))
                    .col(string_len(User::Status, 32).default("pending_sms_verification"))
                    .col(string_len(User::PreferredLanguage, 8).default("uz"))
                    .col(boolean(User::IsPhoneVerified).default(false))
                    .col(string_null(User::PushToken))
                    .col(decimal_len(User::RatingAverage, 3, 2).default(0))
                    .col(integer(User::RatingCount).default(0))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    PhoneNumber,
    FullName,
    Email,
    Gender,
    Role,
    Status,
    PreferredLanguage,
    IsPhoneVerified,
    PushToken,
    RatingAverage,
    RatingCount,
    CreatedAt,
    UpdatedAt,
}
