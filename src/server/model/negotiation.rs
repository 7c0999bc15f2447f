//! Price negotiation domain models and parameters.
//!
//! A negotiation is a chain of offers between one passenger and one driver for one trip.
//! The chain header tracks the overall status and points at the head offer, the only
//! offer that can still be countered, accepted, or rejected.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{NegotiationStatus, OfferProposer, OfferStatus};
use rust_decimal::Decimal;

use crate::model::negotiation::{
    AutoAcceptRuleDto, BulkAnswer, BulkRespondResultDto, NegotiationDto, NegotiationPageDto,
    OfferDto, OpenNegotiationDto, PriceRecommendationDto,
};

/// Default minimum share of the trip price a driver auto-accepts.
pub const DEFAULT_MIN_PRICE_PERCENTAGE: i32 = 80;

/// One link of a negotiation chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub id: i32,
    pub negotiation_id: i32,
    /// Offer this one answers, `None` for the opening offer
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

impl Offer {
    pub fn from_entity(entity: entity::negotiation_offer::Model) -> Self {
        Self {
            id: entity.id,
            negotiation_id: entity.negotiation_id,
            previous_offer_id: entity.previous_offer_id,
            proposer: entity.proposer,
            price: entity.price,
            message: entity.message,
            status: entity.status,
            expires_at: entity.expires_at,
            responded_at: entity.responded_at,
            response_message: entity.response_message,
            auto_accepted: entity.auto_accepted,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> OfferDto {
        OfferDto {
            id: self.id,
            previous_offer_id: self.previous_offer_id,
            proposer: self.proposer,
            price: self.price,
            message: self.message,
            status: self.status,
            expires_at: self.expires_at,
            responded_at: self.responded_at,
            response_message: self.response_message,
            auto_accepted: self.auto_accepted,
            created_at: self.created_at,
        }
    }
}

/// Header values a guarded chain write expects to still find on the row.
///
/// Every transition is written with `status` and `head_offer_id` as the compare values,
/// so of two requests acting on the same head only the first one commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainVersion {
    pub id: i32,
    pub status: NegotiationStatus,
    pub head_offer_id: Option<i32>,
}

impl ChainVersion {
    pub fn of_entity(entity: &entity::price_negotiation::Model) -> Self {
        Self {
            id: entity.id,
            status: entity.status,
            head_offer_id: entity.head_offer_id,
        }
    }
}

/// Negotiation chain header with its ordered offer history.
#[derive(Debug, Clone, PartialEq)]
pub struct Negotiation {
    pub id: i32,
    pub trip_id: i32,
    pub passenger_id: i32,
    pub driver_id: i32,
    pub seats_requested: i32,
    /// Trip seat price at the time the chain was opened
    pub original_price: Decimal,
    pub final_price: Option<Decimal>,
    pub status: NegotiationStatus,
    pub head_offer_id: Option<i32>,
    pub booking_id: Option<i32>,
    pub expires_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Offers ordered oldest first
    pub offers: Vec<Offer>,
}

impl Negotiation {
    /// Builds the domain model from the chain row and its offers.
    ///
    /// # Arguments
    /// - `entity` - Chain header row
    /// - `offers` - Offer rows of the chain in any order, sorted here by insertion
    pub fn from_entity(
        entity: entity::price_negotiation::Model,
        offers: Vec<entity::negotiation_offer::Model>,
    ) -> Self {
        let mut offers: Vec<Offer> = offers.into_iter().map(Offer::from_entity).collect();
        offers.sort_by_key(|offer| offer.id);

        Self {
            id: entity.id,
            trip_id: entity.trip_id,
            passenger_id: entity.passenger_id,
            driver_id: entity.driver_id,
            seats_requested: entity.seats_requested,
            original_price: entity.original_price,
            final_price: entity.final_price,
            status: entity.status,
            head_offer_id: entity.head_offer_id,
            booking_id: entity.booking_id,
            expires_at: entity.expires_at,
            resolved_at: entity.resolved_at,
            created_at: entity.created_at,
            offers,
        }
    }

    pub fn version(&self) -> ChainVersion {
        ChainVersion {
            id: self.id,
            status: self.status,
            head_offer_id: self.head_offer_id,
        }
    }

    /// The offer currently awaiting a response.
    pub fn head(&self) -> Option<&Offer> {
        let head_id = self.head_offer_id?;
        self.offers.iter().find(|offer| offer.id == head_id)
    }

    /// Role of `user_id` in this chain, `None` for outsiders.
    pub fn role_of(&self, user_id: i32) -> Option<OfferProposer> {
        if user_id == self.passenger_id {
            Some(OfferProposer::Passenger)
        } else if user_id == self.driver_id {
            Some(OfferProposer::Driver)
        } else {
            None
        }
    }

    /// User ID of the party on the other side of `role`.
    pub fn counterpart_of(&self, role: OfferProposer) -> i32 {
        match role {
            OfferProposer::Passenger => self.driver_id,
            OfferProposer::Driver => self.passenger_id,
        }
    }

    pub fn into_dto(self) -> NegotiationDto {
        NegotiationDto {
            id: self.id,
            trip_id: self.trip_id,
            passenger_id: self.passenger_id,
            driver_id: self.driver_id,
            seats_requested: self.seats_requested,
            original_price: self.original_price,
            final_price: self.final_price,
            status: self.status,
            head_offer_id: self.head_offer_id,
            booking_id: self.booking_id,
            expires_at: self.expires_at,
            resolved_at: self.resolved_at,
            created_at: self.created_at,
            offers: self.offers.into_iter().map(Offer::into_dto).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaginatedNegotiations {
    pub negotiations: Vec<Negotiation>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedNegotiations {
    pub fn into_dto(self) -> NegotiationPageDto {
        NegotiationPageDto {
            negotiations: self
                .negotiations
                .into_iter()
                .map(Negotiation::into_dto)
                .collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// A driver's auto-accept configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoAcceptRule {
    pub enabled: bool,
    /// Minimum share of the trip price, 1..=100
    pub min_price_percentage: i32,
    /// Largest absolute discount accepted, if any
    pub max_discount_amount: Option<Decimal>,
}

impl Default for AutoAcceptRule {
    fn default() -> Self {
        Self {
            enabled: false,
            min_price_percentage: DEFAULT_MIN_PRICE_PERCENTAGE,
            max_discount_amount: None,
        }
    }
}

impl AutoAcceptRule {
    pub fn from_entity(entity: entity::auto_accept_rule::Model) -> Self {
        Self {
            enabled: entity.enabled,
            min_price_percentage: entity.min_price_percentage,
            max_discount_amount: entity.max_discount_amount,
        }
    }

    pub fn from_dto(dto: AutoAcceptRuleDto) -> Self {
        Self {
            enabled: dto.enabled,
            min_price_percentage: dto.min_price_percentage,
            max_discount_amount: dto.max_discount_amount,
        }
    }

    pub fn into_dto(self) -> AutoAcceptRuleDto {
        AutoAcceptRuleDto {
            enabled: self.enabled,
            min_price_percentage: self.min_price_percentage,
            max_discount_amount: self.max_discount_amount,
        }
    }
}

/// Parameters for a passenger opening a negotiation.
#[derive(Debug, Clone)]
pub struct OpenNegotiationParams {
    pub passenger_id: i32,
    pub trip_id: i32,
    pub seats_requested: i32,
    pub proposed_price: Decimal,
    pub message: Option<String>,
}

impl OpenNegotiationParams {
    pub fn from_dto(passenger_id: i32, dto: OpenNegotiationDto) -> Self {
        Self {
            passenger_id,
            trip_id: dto.trip_id,
            seats_requested: dto.seats_requested,
            proposed_price: dto.proposed_price,
            message: dto.message,
        }
    }
}

/// Column values for inserting an offer.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub negotiation_id: i32,
    pub previous_offer_id: Option<i32>,
    pub proposer: OfferProposer,
    pub price: Decimal,
    pub message: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Suggested seat price for a route.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecommendation {
    pub from_location: String,
    pub to_location: String,
    pub recommended_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Trips the average was computed from, zero when the fallback price was used
    pub sample_size: u64,
}

impl PriceRecommendation {
    pub fn into_dto(self) -> PriceRecommendationDto {
        PriceRecommendationDto {
            from_location: self.from_location,
            to_location: self.to_location,
            recommended_price: self.recommended_price,
            min_price: self.min_price,
            max_price: self.max_price,
            sample_size: self.sample_size,
        }
    }
}

/// Result of answering several chains at once.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    pub answer: BulkAnswer,
    pub succeeded: Vec<i32>,
    pub failed: Vec<i32>,
}

impl BulkOutcome {
    pub fn into_dto(self) -> BulkRespondResultDto {
        BulkRespondResultDto {
            answer: self.answer,
            processed: (self.succeeded.len() + self.failed.len()) as u32,
            succeeded: self.succeeded.len() as u32,
            failed: self.failed.len() as u32,
            failed_ids: self.failed,
        }
    }
}
