use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000006_create_price_negotiation_table::PriceNegotiation;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NegotiationOffer::Table)
                    .if_not_exists()
                    .col(pk_auto(NegotiationOffer::Id))
                    .col(integer(NegotiationOffer::NegotiationId))
                    .col(integer_null(NegotiationOffer::PreviousOfferId))
                    .col(string_len(NegotiationOffer::Proposer, 16))
                    .col(decimal_len(NegotiationOffer::Price, 12, 2))
                    .col(text_null(NegotiationOffer::Message))
                    .col(string_len(NegotiationOffer::Status, 16).default("pending"))
                    .col(timestamp_with_time_zone(NegotiationOffer::ExpiresAt))
                    .col(timestamp_with_time_zone_null(NegotiationOffer::RespondedAt))
                    .col(text_null(NegotiationOffer::ResponseMessage))
                    .col(boolean(NegotiationOffer::AutoAccepted).default(false))
                    .col(
                        timestamp_with_time_zone(NegotiationOffer::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_negotiation_offer_negotiation_id")
                            .from(NegotiationOffer::Table, NegotiationOffer::NegotiationId)
                            .to(PriceNegotiation::Table, PriceNegotiation::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_negotiation_offer_previous_offer_id")
                            .from(NegotiationOffer::Table, NegotiationOffer::PreviousOfferId)
                            .to(NegotiationOffer::Table, NegotiationOffer::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NegotiationOffer::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum NegotiationOffer {
    Table,
    Id,
    NegotiationId,
    PreviousOfferId,
    Proposer,
    Price,
    Message,
    Status,
    ExpiresAt,
    RespondedAt,
    ResponseMessage,
    AutoAccepted,
    CreatedAt,
}
