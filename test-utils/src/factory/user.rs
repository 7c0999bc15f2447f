//! User factory for creating test user entities.

use crate::factory::helpers::next_id;
use chrono::Utc;
use entity::sea_orm_active_enums::{Gender, UserRole, UserStatus};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test users with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::user::UserFactory;
///
/// let user = UserFactory::new(&db)
///     .phone_number("+998901234567")
///     .role(UserRole::Driver)
///     .build()
///     .await?;
/// ```
pub struct UserFactory<'a> {
    db: &'a DatabaseConnection,
    phone_number: String,
    full_name: Option<String>,
    email: Option<String>,
    gender: Option<Gender>,
    role: UserRole,
    status: UserStatus,
    push_token: Option<String>,
}

impl<'a> UserFactory<'a> {
    /// Creates a new UserFactory with default values.
    ///
    /// Defaults:
    /// - phone_number: `+99890` followed by the zero padded counter
    /// - full_name: `"User {id}"`
    /// - role: `Passenger`, status: `Active`
    /// - no email, gender or push token
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            phone_number: format!("+99890{:07}", id),
            full_name: Some(format!("User {}", id)),
            email: None,
            gender: None,
            role: UserRole::Passenger,
            status: UserStatus::Active,
            push_token: None,
        }
    }

    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = phone_number.into();
        self
    }

    pub fn full_name(mut self, full_name: Option<&str>) -> Self {
        self.full_name = full_name.map(str::to_string);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    pub fn push_token(mut self, push_token: impl Into<String>) -> Self {
        self.push_token = Some(push_token.into());
        self
    }

    /// Builds and inserts the user entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::user::Model)` - Created user entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::user::Model, DbErr> {
        let now = Utc::now();
        entity::user::ActiveModel {
            phone_number: ActiveValue::Set(self.phone_number),
            full_name: ActiveValue::Set(self.full_name),
            email: ActiveValue::Set(self.email),
            gender: ActiveValue::Set(self.gender),
            role: ActiveValue::Set(self.role),
            is_phone_verified: ActiveValue::Set(self.status != UserStatus::PendingSmsVerification),
            status: ActiveValue::Set(self.status),
            preferred_language: ActiveValue::Set("uz".to_string()),
            push_token: ActiveValue::Set(self.push_token),
            rating_average: ActiveValue::Set(Decimal::ZERO),
            rating_count: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates an active passenger with default values.
pub async fn create_user(db: &DatabaseConnection) -> Result<entity::user::Model, DbErr> {
    UserFactory::new(db).build().await
}

/// Creates an active, approved driver.
pub async fn create_driver(db: &DatabaseConnection) -> Result<entity::user::Model, DbErr> {
    UserFactory::new(db).role(UserRole::Driver).build().await
}

/// Creates an active admin.
pub async fn create_admin(db: &DatabaseConnection) -> Result<entity::user::Model, DbErr> {
    UserFactory::new(db).role(UserRole::Admin).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TestBuilder;
    use entity::prelude::*;

    #[tokio::test]
    async fn creates_user_with_defaults() -> Result<(), DbErr> {
        let test = TestBuilder::new().with_table(User).build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let user = create_user(db).await?;

        assert!(user.phone_number.starts_with("+998"));
        assert_eq!(user.phone_number.len(), 13);
        assert_eq!(user.role, UserRole::Passenger);
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.is_phone_verified);

        Ok(())
    }

    #[tokio::test]
    async fn creates_multiple_unique_users() -> Result<(), DbErr> {
        let test = TestBuilder::new().with_table(User).build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let user1 = create_user(db).await?;
        let user2 = create_driver(db).await?;

        assert_ne!(user1.phone_number, user2.phone_number);
        assert_eq!(user2.role, UserRole::Driver);

        Ok(())
    }
}
