//! Travel preferences, notification settings and compatibility between travelers.

use entity::sea_orm_active_enums::{Gender, HabitPreference};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use crate::{
    model::preference::UpdateUserSettingsDto,
    server::{
        data::{preference::PreferenceRepository, user::UserRepository},
        error::AppError,
        model::preference::{Compatibility, TravelPreference, UserSettings},
    },
};

/// Points each habit dimension contributes to the score.
pub const DIMENSION_POINTS: i32 = 25;
/// Points lost on a dimension where either side has no preference.
pub const NO_PREFERENCE_PENALTY: i32 = 10;
/// Lowest score considered compatible.
pub const COMPATIBLE_THRESHOLD: i32 = 60;

fn dimension_score(a: HabitPreference, b: HabitPreference) -> i32 {
    match (a, b) {
        (HabitPreference::NoPreference, _) | (_, HabitPreference::NoPreference) => {
            DIMENSION_POINTS - NO_PREFERENCE_PENALTY
        }
        (a, b) if a == b => DIMENSION_POINTS,
        _ => 0,
    }
}

/// Whether `preference` excludes a traveler of `gender`. Unknown genders never clash.
fn gender_excluded(preference: &TravelPreference, gender: Option<Gender>) -> bool {
    match (preference.preferred_gender, gender) {
        (Some(wanted), Some(actual)) => wanted != actual,
        _ => false,
    }
}

/// Scores two travelers across smoking, pets, music and talking.
///
/// # Arguments
/// - `a` / `b` - Travel preferences of the two users
/// - `gender_a` / `gender_b` - Their genders, checked against the other's gender preference
///
/// # Returns
/// Score in 0..=100; 0 whenever either side's gender preference excludes the other.
pub fn compatibility_score(
    a: &TravelPreference,
    gender_a: Option<Gender>,
    b: &TravelPreference,
    gender_b: Option<Gender>,
) -> i32 {
    if gender_excluded(a, gender_b) || gender_excluded(b, gender_a) {
        return 0;
    }

    dimension_score(a.smoking, b.smoking)
        + dimension_score(a.pets, b.pets)
        + dimension_score(a.music, b.music)
        + dimension_score(a.talking, b.talking)
}

pub struct PreferenceService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PreferenceService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the user's travel preferences, defaults when never set.
    pub async fn get_travel_preference(
        &self,
        user_id: i32,
    ) -> Result<TravelPreference, AppError> {
        Ok(PreferenceRepository::new(self.db)
            .get_travel_preference(user_id)
            .await?
            .unwrap_or_default())
    }

    /// Replaces the user's travel preferences.
    ///
    /// # Returns
    /// - `Ok(TravelPreference)` - Stored preferences
    /// - `Err(AppError::BadRequest)` - Non-positive maximum seat price
    pub async fn save_travel_preference(
        &self,
        user_id: i32,
        preference: TravelPreference,
    ) -> Result<TravelPreference, AppError> {
        if preference
            .max_price_per_seat
            .is_some_and(|price| price <= Decimal::ZERO)
        {
            return Err(AppError::BadRequest(
                "Maximum price per seat must be positive".to_string(),
            ));
        }

        Ok(PreferenceRepository::new(self.db)
            .save_travel_preference(user_id, preference)
            .await?)
    }

    pub async fn get_settings(&self, user_id: i32) -> Result<UserSettings, AppError> {
        Ok(PreferenceRepository::new(self.db)
            .get_settings(user_id)
            .await?)
    }

    /// Applies a partial settings update on top of the stored or default settings.
    pub async fn update_settings(
        &self,
        user_id: i32,
        update: UpdateUserSettingsDto,
    ) -> Result<UserSettings, AppError> {
        let repo = PreferenceRepository::new(self.db);
        let settings = repo.get_settings(user_id).await?.apply(update);

        Ok(repo.save_settings(user_id, settings).await?)
    }

    /// Scores the caller against another user.
    ///
    /// # Returns
    /// - `Ok(Compatibility)` - Score and verdict
    /// - `Err(AppError::BadRequest)` - Comparing a user with themselves
    /// - `Err(AppError::NotFound)` - Either user does not exist
    pub async fn compatibility(
        &self,
        user_id: i32,
        other_user_id: i32,
    ) -> Result<Compatibility, AppError> {
        if user_id == other_user_id {
            return Err(AppError::BadRequest(
                "Cannot check compatibility with yourself".to_string(),
            ));
        }

        let users = UserRepository::new(self.db);
        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let other = users
            .find_by_id(other_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mine = self.get_travel_preference(user.id).await?;
        let theirs = self.get_travel_preference(other.id).await?;
        let score = compatibility_score(&mine, user.gender, &theirs, other.gender);

        Ok(Compatibility {
            user_id: user.id,
            other_user_id: other.id,
            score,
            is_compatible: score >= COMPATIBLE_THRESHOLD,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habits(
        smoking: HabitPreference,
        pets: HabitPreference,
        music: HabitPreference,
        talking: HabitPreference,
    ) -> TravelPreference {
        TravelPreference {
            smoking,
            pets,
            music,
            talking,
            ..Default::default()
        }
    }

    /// Expected: identical explicit answers score the full 100
    #[test]
    fn identical_habits_score_full() {
        use HabitPreference::{No, Yes};
        let a = habits(No, Yes, Yes, No);

        assert_eq!(compatibility_score(&a, None, &a.clone(), None), 100);
    }

    /// Expected: each no_preference dimension costs 10 points
    #[test]
    fn no_preference_costs_ten_per_dimension() {
        let a = TravelPreference::default();
        let b = TravelPreference::default();

        assert_eq!(compatibility_score(&a, None, &b, None), 60);
    }

    /// Expected: a yes/no clash loses the whole dimension
    #[test]
    fn clash_loses_dimension() {
        use HabitPreference::{No, Yes};
        let a = habits(Yes, Yes, Yes, Yes);
        let b = habits(No, Yes, No, Yes);

        assert_eq!(compatibility_score(&a, None, &b, None), 50);
    }

    /// Expected: a gender preference the other user does not meet zeroes the score
    #[test]
    fn gender_mismatch_zeroes_score() {
        let a = TravelPreference {
            preferred_gender: Some(Gender::Female),
            ..Default::default()
        };
        let b = TravelPreference::default();

        assert_eq!(
            compatibility_score(&a, Some(Gender::Female), &b, Some(Gender::Male)),
            0
        );
        assert_eq!(
            compatibility_score(&a, Some(Gender::Female), &b, Some(Gender::Female)),
            60
        );
    }

    /// Expected: an unknown gender never triggers the mismatch rule
    #[test]
    fn unknown_gender_is_not_a_mismatch() {
        let a = TravelPreference {
            preferred_gender: Some(Gender::Male),
            ..Default::default()
        };

        assert_eq!(
            compatibility_score(&a, None, &TravelPreference::default(), None),
            60
        );
    }
}
