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
                    .table(AutoAcceptRule::Table)
                    .if_not_exists()
                    .col(pk_auto(AutoAcceptRule::Id))
                    .col(integer_uniq(AutoAcceptRule::DriverId))
                    .col(boolean(AutoAcceptRule::Enabled).default(false))
                    .col(integer(AutoAcceptRule::MinPricePercentage).default(80))
                    .col(decimal_len_null(AutoAcceptRule::MaxDiscountAmount, 12, 2))
                    .col(
                        timestamp_with_time_zone(AutoAcceptRule::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(AutoAcceptRule::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auto_accept_rule_driver_id")
                            .from(AutoAcceptRule::Table, AutoAcceptRule::DriverId)
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
            .drop_table(Table::drop().table(AutoAcceptRule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AutoAcceptRule {
    Table,
    Id,
    DriverId,
    Enabled,
    MinPricePercentage,
    MaxDiscountAmount,
    CreatedAt,
    UpdatedAt,
}
