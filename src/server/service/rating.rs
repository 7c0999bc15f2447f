//! Trip ratings between drivers and passengers.
//!
//! The rated user's cached `rating_average` and `rating_count` are recomputed from all
//! received ratings after every create, edit or delete, inside the same transaction.

use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::{BookingStatus, RatingType, TripStatus};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::server::{
    data::{
        booking::BookingRepository, rating::RatingRepository, trip::TripRepository,
        user::UserRepository,
    },
    error::AppError,
    model::rating::{
        CreateRatingParams, NewRating, RateableUser, Rating, RatingEligibility, RatingSummary,
        UpdateRatingParams,
    },
};

/// Maximum review length in characters.
pub const MAX_REVIEW_LENGTH: usize = 1000;

/// Hours after creation during which the rater may edit or delete a rating.
pub const RATING_EDIT_WINDOW_HOURS: i64 = 24;

pub struct RatingService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RatingService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Rates the other side of a shared trip.
    ///
    /// The trip must be completed or cancelled by its driver. A driver may rate a
    /// passenger and a passenger may rate the driver, provided the passenger held a
    /// confirmed or driver-cancelled booking on the trip.
    ///
    /// # Arguments
    /// - `params` - Rater, trip, rated user, score and optional sub-scores
    ///
    /// # Returns
    /// - `Ok(Rating)` - Stored rating
    /// - `Err(AppError::BadRequest)` - Score out of range, self rating or trip not finished
    /// - `Err(AppError::NotFound)` - Trip does not exist
    /// - `Err(AppError::Forbidden)` - The two users did not travel together
    /// - `Err(AppError::Conflict)` - Rater already rated this user for this trip
    pub async fn create(&self, params: CreateRatingParams) -> Result<Rating, AppError> {
        validate_scores(
            params.score,
            [
                params.punctuality,
                params.cleanliness,
                params.communication,
                params.driving_quality,
            ],
            params.review.as_deref(),
        )?;
        if params.rater_id == params.rated_user_id {
            return Err(AppError::BadRequest("You cannot rate yourself".to_string()));
        }

        let txn = self.db.begin().await?;

        let trip = TripRepository::new(&txn)
            .find_by_id(params.trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
        if !is_rateable_trip(trip.status) {
            return Err(AppError::BadRequest(
                "Trips can only be rated once they are completed".to_string(),
            ));
        }

        let (rating_type, passenger_id) = if params.rater_id == trip.driver_id {
            (RatingType::DriverToPassenger, params.rated_user_id)
        } else if params.rated_user_id == trip.driver_id {
            (RatingType::PassengerToDriver, params.rater_id)
        } else {
            return Err(AppError::Forbidden(
                "Ratings are only between a driver and their passengers".to_string(),
            ));
        };

        let booking = BookingRepository::new(&txn)
            .find_shared_trip_booking(trip.id, passenger_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("You did not travel together on this trip".to_string())
            })?;

        let repo = RatingRepository::new(&txn);
        if repo
            .exists(trip.id, params.rater_id, params.rated_user_id)
            .await?
        {
            return Err(AppError::Conflict(
                "You have already rated this user for this trip".to_string(),
            ));
        }

        let rated_user_id = params.rated_user_id;
        let rating = repo
            .create(NewRating {
                params,
                booking_id: Some(booking.id),
                rating_type,
            })
            .await?;
        refresh_aggregate(&txn, rated_user_id).await?;

        txn.commit().await?;

        Ok(rating)
    }

    pub async fn get_given(&self, user_id: i32) -> Result<Vec<Rating>, AppError> {
        Ok(RatingRepository::new(self.db).get_given(user_id).await?)
    }

    pub async fn get_received(&self, user_id: i32) -> Result<Vec<Rating>, AppError> {
        Ok(RatingRepository::new(self.db).get_received(user_id).await?)
    }

    /// Average, count and 1..5 distribution of the ratings a user received.
    ///
    /// # Returns
    /// - `Ok(RatingSummary)` - Summary, zeroed when nothing was received
    /// - `Err(AppError::NotFound)` - No such user
    pub async fn summary(&self, user_id: i32) -> Result<RatingSummary, AppError> {
        if UserRepository::new(self.db)
            .find_by_id(user_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let scores = RatingRepository::new(self.db).scores_of(user_id).await?;

        Ok(summarize(user_id, &scores))
    }

    /// Edits a rating the caller gave within [`RATING_EDIT_WINDOW_HOURS`] of creating it.
    ///
    /// # Arguments
    /// - `rater_id` - Signed-in user
    /// - `rating_id` - Rating to edit
    /// - `params` - Replacement score, review and sub-scores
    ///
    /// # Returns
    /// - `Ok(Rating)` - Updated rating
    /// - `Err(AppError::BadRequest)` - Scores out of range or edit window closed
    /// - `Err(AppError::Forbidden)` - Caller did not write this rating
    /// - `Err(AppError::NotFound)` - No such rating
    pub async fn update(
        &self,
        rater_id: i32,
        rating_id: i32,
        params: UpdateRatingParams,
    ) -> Result<Rating, AppError> {
        validate_scores(
            params.score,
            [
                params.punctuality,
                params.cleanliness,
                params.communication,
                params.driving_quality,
            ],
            params.review.as_deref(),
        )?;

        let txn = self.db.begin().await?;
        let repo = RatingRepository::new(&txn);

        let rating = find_editable(&repo, rater_id, rating_id, "edit").await?;
        let rating = repo.update(rating.id, params).await?;
        refresh_aggregate(&txn, rating.rated_user_id).await?;

        txn.commit().await?;

        Ok(rating)
    }

    /// Deletes a rating the caller gave within [`RATING_EDIT_WINDOW_HOURS`] of creating it.
    pub async fn delete(&self, rater_id: i32, rating_id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let repo = RatingRepository::new(&txn);

        let rating = find_editable(&repo, rater_id, rating_id, "delete").await?;

        repo.delete(rating.id).await?;
        refresh_aggregate(&txn, rating.rated_user_id).await?;

        txn.commit().await?;

        Ok(())
    }

    /// Tells the caller whether they can rate the other side of a booking.
    ///
    /// A booking the caller is not part of, an unfinished trip, or a booking the
    /// passenger cancelled all make the caller ineligible rather than failing.
    ///
    /// # Returns
    /// - `Ok(RatingEligibility)` - Eligibility with the rateable user when eligible
    /// - `Err(AppError::NotFound)` - Booking or its trip does not exist
    pub async fn can_rate(
        &self,
        user_id: i32,
        booking_id: i32,
    ) -> Result<RatingEligibility, AppError> {
        let booking = BookingRepository::new(self.db)
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        let trip = TripRepository::new(self.db)
            .find_by_id(booking.trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        if user_id != booking.passenger_id && user_id != trip.driver_id {
            return Ok(RatingEligibility::Ineligible("Not involved in this booking"));
        }
        if !is_rateable_trip(trip.status) {
            return Ok(RatingEligibility::Ineligible("Trip not completed"));
        }
        if !matches!(
            booking.status,
            BookingStatus::Confirmed | BookingStatus::CancelledByDriver
        ) {
            return Ok(RatingEligibility::Ineligible("Invalid booking status"));
        }

        let (rated_user_id, rating_type) = if user_id == trip.driver_id {
            (booking.passenger_id, RatingType::DriverToPassenger)
        } else {
            (trip.driver_id, RatingType::PassengerToDriver)
        };
        let already_rated = RatingRepository::new(self.db)
            .exists(trip.id, user_id, rated_user_id)
            .await?;

        Ok(RatingEligibility::Eligible {
            trip_id: trip.id,
            rateable_users: vec![RateableUser {
                user_id: rated_user_id,
                rating_type,
                booking_id: booking.id,
                already_rated,
            }],
        })
    }

    /// Lists the trip participants the caller has not rated yet.
    ///
    /// The driver sees every passenger who traveled; a passenger who traveled sees the
    /// driver. Anyone else, or any trip that is not finished, gets an empty list.
    pub async fn pending_for_trip(
        &self,
        user_id: i32,
        trip_id: i32,
    ) -> Result<Vec<RateableUser>, AppError> {
        let trip = TripRepository::new(self.db)
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
        if !is_rateable_trip(trip.status) {
            return Ok(Vec::new());
        }

        let bookings = BookingRepository::new(self.db)
            .get_shared_by_trip(trip.id)
            .await?;
        let candidates: Vec<RateableUser> = if user_id == trip.driver_id {
            bookings
                .into_iter()
                .map(|booking| RateableUser {
                    user_id: booking.passenger_id,
                    rating_type: RatingType::DriverToPassenger,
                    booking_id: booking.id,
                    already_rated: false,
                })
                .collect()
        } else {
            bookings
                .into_iter()
                .filter(|booking| booking.passenger_id == user_id)
                .take(1)
                .map(|booking| RateableUser {
                    user_id: trip.driver_id,
                    rating_type: RatingType::PassengerToDriver,
                    booking_id: booking.id,
                    already_rated: false,
                })
                .collect()
        };

        let repo = RatingRepository::new(self.db);
        let mut pending = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !repo.exists(trip.id, user_id, candidate.user_id).await? {
                pending.push(candidate);
            }
        }

        Ok(pending)
    }
}

fn is_rateable_trip(status: TripStatus) -> bool {
    matches!(status, TripStatus::Completed | TripStatus::CancelledByDriver)
}

/// Loads a rating the caller may still change.
async fn find_editable<C: ConnectionTrait>(
    repo: &RatingRepository<'_, C>,
    rater_id: i32,
    rating_id: i32,
    action: &str,
) -> Result<Rating, AppError> {
    let rating = repo
        .find_by_id(rating_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rating not found".to_string()))?;
    if rating.rater_id != rater_id {
        return Err(AppError::Forbidden(format!(
            "You can only {} ratings you gave",
            action
        )));
    }
    if rating.created_at + Duration::hours(RATING_EDIT_WINDOW_HOURS) < Utc::now() {
        return Err(AppError::BadRequest(format!(
            "Ratings can only be changed within {} hours",
            RATING_EDIT_WINDOW_HOURS
        )));
    }

    Ok(rating)
}

async fn refresh_aggregate<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<(), AppError> {
    let scores = RatingRepository::new(db).scores_of(user_id).await?;
    let summary = summarize(user_id, &scores);

    UserRepository::new(db)
        .update_rating(user_id, summary.average, summary.count)
        .await?;

    Ok(())
}

fn validate_scores(
    score: i32,
    sub_scores: [Option<i32>; 4],
    review: Option<&str>,
) -> Result<(), AppError> {
    let in_range = |score: i32| (1..=5).contains(&score);

    if !in_range(score) {
        return Err(AppError::BadRequest(
            "Score must be between 1 and 5".to_string(),
        ));
    }
    if sub_scores.into_iter().flatten().any(|score| !in_range(score)) {
        return Err(AppError::BadRequest(
            "Detailed scores must be between 1 and 5".to_string(),
        ));
    }
    if review.is_some_and(|review| review.chars().count() > MAX_REVIEW_LENGTH) {
        return Err(AppError::BadRequest(format!(
            "Review cannot exceed {} characters",
            MAX_REVIEW_LENGTH
        )));
    }
    Ok(())
}

/// Builds the rating summary for a list of scores; the average is rounded to 2 places.
fn summarize(user_id: i32, scores: &[i32]) -> RatingSummary {
    let mut distribution = [0u64; 5];
    for &score in scores {
        if (1..=5).contains(&score) {
            distribution[(score - 1) as usize] += 1;
        }
    }

    let average = if scores.is_empty() {
        Decimal::ZERO
    } else {
        let total: i64 = scores.iter().map(|&score| i64::from(score)).sum();
        (Decimal::from(total) / Decimal::from(scores.len() as i64)).round_dp(2)
    };

    RatingSummary {
        user_id,
        average,
        count: scores.len() as i32,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_empty_scores() {
        let summary = summarize(7, &[]);

        assert_eq!(summary.average, Decimal::ZERO);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.distribution, [0, 0, 0, 0, 0]);
    }

    /// Expected: (5 + 4 + 4) / 3 = 4.333.. rounds to 4.33
    #[test]
    fn summarize_rounds_average() {
        let summary = summarize(7, &[5, 4, 4]);

        assert_eq!(summary.average, Decimal::new(433, 2));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.distribution, [0, 0, 0, 2, 1]);
    }
}
