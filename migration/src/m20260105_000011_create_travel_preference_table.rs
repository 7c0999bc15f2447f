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
                    .table(TravelPreference::Table)
                    .if_not_exists()
                    .col(pk_auto(TravelPreference::Id))
                    .col(integer_uniq(TravelPreference::UserId))
                    .col(string_len(TravelPreference::Smoking, 16).default("no_preference"))
                    .col(string_len(TravelPreference::Pets, 16).default("no_preference"))
                    .col(string_len(TravelPreference::Music, 16).default("no_preference"))
                    .col(string_len(TravelPreference::Talking, 16).default("no_preference"))
                    .col(string_len_null(TravelPreference::PreferredGender, 16))
                    .col(string_len_null(TravelPreference::ComfortLevel, 16))
                    .col(decimal_len_null(TravelPreference::MaxPricePerSeat, 12, 2))
                    .col(
                        timestamp_with_time_zone(TravelPreference::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travel_preference_user_id")
                            .from(TravelPreference::Table, TravelPreference::UserId)
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
            .drop_table(Table::drop().table(TravelPreference::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TravelPreference {
    Table,
    Id,
    UserId,
    Smoking,
    Pets,
    Music,
    Talking,
    PreferredGender,
    ComfortLevel,
    MaxPricePerSeat,
    UpdatedAt,
}
