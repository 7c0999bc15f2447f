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
                    .table(UserSettings::Table)
                    .if_not_exists()
                    .col(pk_auto(UserSettings::Id))
                    .col(integer_uniq(UserSettings::UserId))
                    .col(boolean(UserSettings::SmsNotifications).default(true))
                    .col(boolean(UserSettings::PushNotifications).default(true))
                    .col(boolean(UserSettings::EmailNotifications).default(false))
                    .col(boolean(UserSettings::ProfileVisible).default(true))
                    .col(boolean(UserSettings::ShowPhoneToConfirmed).default(true))
                    .col(
                        timestamp_with_time_zone(UserSettings::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_settings_user_id")
                            .from(UserSettings::Table, UserSettings::UserId)
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
            .drop_table(Table::drop().table(UserSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UserSettings {
    Table,
    Id,
    UserId,
    SmsNotifications,
    PushNotifications,
    EmailNotifications,
    ProfileVisible,
    ShowPhoneToConfirmed,
    UpdatedAt,
}
