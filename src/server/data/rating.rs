//! Rating data repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::rating::{NewRating, Rating, UpdateRatingParams};

pub struct RatingRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RatingRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, rating: NewRating) -> Result<Rating, DbErr> {
        let params = rating.params;
        let entity = entity::rating::ActiveModel {
            trip_id: ActiveValue::Set(params.trip_id),
            booking_id: ActiveValue::Set(rating.booking_id),
            rater_id: ActiveValue::Set(params.rater_id),
            rated_user_id: ActiveValue::Set(params.rated_user_id),
            rating_type: ActiveValue::Set(rating.rating_type),
            score: ActiveValue::Set(params.score),
            review: ActiveValue::Set(params.review),
            punctuality: ActiveValue::Set(params.punctuality),
            cleanliness: ActiveValue::Set(params.cleanliness),
            communication: ActiveValue::Set(params.communication),
            driving_quality: ActiveValue::Set(params.driving_quality),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Rating::from_entity(entity))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Rating>, DbErr> {
        let entity = entity::prelude::Rating::find_by_id(id).one(self.db).await?;

        Ok(entity.map(Rating::from_entity))
    }

    /// Whether `rater_id` already rated `rated_user_id` for this trip.
    pub async fn exists(
        &self,
        trip_id: i32,
        rater_id: i32,
        rated_user_id: i32,
    ) -> Result<bool, DbErr> {
        let count = entity::prelude::Rating::find()
            .filter(entity::rating::Column::TripId.eq(trip_id))
            .filter(entity::rating::Column::RaterId.eq(rater_id))
            .filter(entity::rating::Column::RatedUserId.eq(rated_user_id))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    pub async fn get_given(&self, rater_id: i32) -> Result<Vec<Rating>, DbErr> {
        let ratings = entity::prelude::Rating::find()
            .filter(entity::rating::Column::RaterId.eq(rater_id))
            .order_by_desc(entity::rating::Column::CreatedAt)
            .order_by_desc(entity::rating::Column::Id)
            .all(self.db)
            .await?;

        Ok(ratings.into_iter().map(Rating::from_entity).collect())
    }

    pub async fn get_received(&self, rated_user_id: i32) -> Result<Vec<Rating>, DbErr> {
        let ratings = entity::prelude::Rating::find()
            .filter(entity::rating::Column::RatedUserId.eq(rated_user_id))
            .order_by_desc(entity::rating::Column::CreatedAt)
            .order_by_desc(entity::rating::Column::Id)
            .all(self.db)
            .await?;

        Ok(ratings.into_iter().map(Rating::from_entity).collect())
    }

    /// Scores of every rating a user received.
    pub async fn scores_of(&self, rated_user_id: i32) -> Result<Vec<i32>, DbErr> {
        Ok(self
            .get_received(rated_user_id)
            .await?
            .into_iter()
            .map(|rating| rating.score)
            .collect())
    }

    /// Overwrites the scores and review of a rating.
    ///
    /// # Arguments
    /// - `id` - Rating ID
    /// - `params` - Replacement score, review and sub-scores
    ///
    /// # Returns
    /// - `Ok(Rating)` - The updated rating
    /// - `Err(DbErr::RecordNotFound)` - No rating with this ID
    pub async fn update(&self, id: i32, params: UpdateRatingParams) -> Result<Rating, DbErr> {
        let rating = entity::prelude::Rating::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Rating with id {} not found", id)))?;

        let mut rating = rating.into_active_model();
        rating.score = ActiveValue::Set(params.score);
        rating.review = ActiveValue::Set(params.review);
        rating.punctuality = ActiveValue::Set(params.punctuality);
        rating.cleanliness = ActiveValue::Set(params.cleanliness);
        rating.communication = ActiveValue::Set(params.communication);
        rating.driving_quality = ActiveValue::Set(params.driving_quality);

        Ok(Rating::from_entity(rating.update(self.db).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Rating::delete_by_id(id).exec(self.db).await?;
        Ok(())
    }
}
