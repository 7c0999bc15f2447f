use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{ComfortLevel, NegotiationStatus, OfferProposer, OfferStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpenNegotiationDto {
    pub trip_id: i32,
    #[serde(default = "default_seats")]
    pub seats_requested: i32,
    pub proposed_price: Decimal,
    pub message: Option<String>,
}

fn default_seats() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CounterOfferDto {
    pub price: Decimal,
    pub message: Option<String>,
}

/// Optional note attached to an accept or reject.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RespondOfferDto {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OfferDto {
    pub id: i32,
    pub previous_offer_id: Option<i32>,
    pub proposer: OfferProposer,
    pub price: Decimal,
    pub message: Option<String>,
    pub status: OfferStatus,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub response_message: Option<String>,
    pub auto_accepted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NegotiationDto {
    pub id: i32,
    pub trip_id: i32,
    pub passenger_id: i32,
    pub driver_id: i32,
    pub seats_requested: i32,
    pub original_price: Decimal,
    pub final_price: Option<Decimal>,
    pub status: NegotiationStatus,
    pub head_offer_id: Option<i32>,
    pub booking_id: Option<i32>,
    pub expires_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Offer history, opening offer first
    pub offers: Vec<OfferDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NegotiationPageDto {
    pub negotiations: Vec<NegotiationDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// Filters for the offer inbox endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NegotiationListQuery {
    pub status: Option<NegotiationStatus>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_entries")]
    pub entries: u64,
}

fn default_entries() -> u64 {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AutoAcceptRuleDto {
    pub enabled: bool,
    pub min_price_percentage: i32,
    pub max_discount_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PriceRecommendationQuery {
    pub from_location: String,
    pub to_location: String,
    pub comfort_level: Option<ComfortLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceRecommendationDto {
    pub from_location: String,
    pub to_location: String,
    pub recommended_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Number of trips the average was computed from, zero when the fallback was used
    pub sample_size: u64,
}

/// Answer applied to every chain of a bulk response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulkAnswer {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkRespondDto {
    /// At most 20 chains the caller drives
    pub negotiation_ids: Vec<i32>,
    pub answer: BulkAnswer,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkRespondResultDto {
    pub answer: BulkAnswer,
    pub processed: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub failed_ids: Vec<i32>,
}
