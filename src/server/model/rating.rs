//! Rating domain models and parameters.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::RatingType;
use rust_decimal::Decimal;

use crate::model::rating::{
    CreateRatingDto, RateableUserDto, RatingDto, RatingEligibilityDto, RatingSummaryDto,
    UpdateRatingDto,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub id: i32,
    pub trip_id: i32,
    pub booking_id: Option<i32>,
    pub rater_id: i32,
    pub rated_user_id: i32,
    pub rating_type: RatingType,
    pub score: i32,
    pub review: Option<String>,
    pub punctuality: Option<i32>,
    pub cleanliness: Option<i32>,
    pub communication: Option<i32>,
    pub driving_quality: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn from_entity(entity: entity::rating::Model) -> Self {
        Self {
            id: entity.id,
            trip_id: entity.trip_id,
            booking_id: entity.booking_id,
            rater_id: entity.rater_id,
            rated_user_id: entity.rated_user_id,
            rating_type: entity.rating_type,
            score: entity.score,
            review: entity.review,
            punctuality: entity.punctuality,
            cleanliness: entity.cleanliness,
            communication: entity.communication,
            driving_quality: entity.driving_quality,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> RatingDto {
        RatingDto {
            id: self.id,
            trip_id: self.trip_id,
            booking_id: self.booking_id,
            rater_id: self.rater_id,
            rated_user_id: self.rated_user_id,
            rating_type: self.rating_type,
            score: self.score,
            review: self.review,
            punctuality: self.punctuality,
            cleanliness: self.cleanliness,
            communication: self.communication,
            driving_quality: self.driving_quality,
            created_at: self.created_at,
        }
    }
}

/// Aggregate of the ratings a user received.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSummary {
    pub user_id: i32,
    pub average: Decimal,
    pub count: i32,
    /// Counts for scores 1 through 5
    pub distribution: [u64; 5],
}

impl RatingSummary {
    pub fn into_dto(self) -> RatingSummaryDto {
        RatingSummaryDto {
            user_id: self.user_id,
            average: self.average,
            count: self.count,
            distribution: self.distribution.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateRatingParams {
    pub rater_id: i32,
    pub trip_id: i32,
    pub rated_user_id: i32,
    pub score: i32,
    pub review: Option<String>,
    pub punctuality: Option<i32>,
    pub cleanliness: Option<i32>,
    pub communication: Option<i32>,
    pub driving_quality: Option<i32>,
}

impl CreateRatingParams {
    pub fn from_dto(rater_id: i32, dto: CreateRatingDto) -> Self {
        Self {
            rater_id,
            trip_id: dto.trip_id,
            rated_user_id: dto.rated_user_id,
            score: dto.score,
            review: dto.review.filter(|review| !review.trim().is_empty()),
            punctuality: dto.punctuality,
            cleanliness: dto.cleanliness,
            communication: dto.communication,
            driving_quality: dto.driving_quality,
        }
    }
}

/// Column values for a rating insert once eligibility has been checked.
#[derive(Debug, Clone)]
pub struct NewRating {
    pub params: CreateRatingParams,
    pub booking_id: Option<i32>,
    pub rating_type: RatingType,
}

/// Replacement values for a rating edited inside its edit window.
#[derive(Debug, Clone)]
pub struct UpdateRatingParams {
    pub score: i32,
    pub review: Option<String>,
    pub punctuality: Option<i32>,
    pub cleanliness: Option<i32>,
    pub communication: Option<i32>,
    pub driving_quality: Option<i32>,
}

impl UpdateRatingParams {
    pub fn from_dto(dto: UpdateRatingDto) -> Self {
        Self {
            score: dto.score,
            review: dto.review.filter(|review| !review.trim().is_empty()),
            punctuality: dto.punctuality,
            cleanliness: dto.cleanliness,
            communication: dto.communication,
            driving_quality: dto.driving_quality,
        }
    }
}

/// Someone the caller traveled with and may rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RateableUser {
    pub user_id: i32,
    pub rating_type: RatingType,
    pub booking_id: i32,
    pub already_rated: bool,
}

impl RateableUser {
    pub fn into_dto(self) -> RateableUserDto {
        RateableUserDto {
            user_id: self.user_id,
            rating_type: self.rating_type,
            booking_id: self.booking_id,
            already_rated: self.already_rated,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatingEligibility {
    Eligible {
        trip_id: i32,
        rateable_users: Vec<RateableUser>,
    },
    Ineligible(&'static str),
}

impl RatingEligibility {
    pub fn into_dto(self) -> RatingEligibilityDto {
        match self {
            Self::Eligible {
                trip_id,
                rateable_users,
            } => RatingEligibilityDto {
                can_rate: true,
                reason: None,
                trip_id: Some(trip_id),
                rateable_users: rateable_users
                    .into_iter()
                    .map(RateableUser::into_dto)
                    .collect(),
            },
            Self::Ineligible(reason) => RatingEligibilityDto {
                can_rate: false,
                reason: Some(reason.to_string()),
                trip_id: None,
                rateable_users: Vec::new(),
            },
        }
    }
}
