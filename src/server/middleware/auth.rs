use entity::sea_orm_active_enums::{UserRole, UserStatus};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::user::UserRepository,
    error::{auth::AuthError, AppError},
    middleware::token::BearerToken,
    model::user::User,
    service::auth::token::{TokenKind, TokenService},
};

/// Access requirements checked by `AuthGuard::require`.
pub enum Permission {
    /// User has the admin role.
    Admin,
    /// User has the driver role, approved or still awaiting approval.
    Driver,
    /// User has the driver role and an admin approved the application.
    ApprovedDriver,
}

pub struct AuthGuard<'a> {
    db: &'a DatabaseConnection,
    tokens: &'a TokenService,
    bearer: &'a BearerToken,
}

impl<'a> AuthGuard<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        tokens: &'a TokenService,
        bearer: &'a BearerToken,
    ) -> Self {
        Self { db, tokens, bearer }
    }

    /// Resolves the bearer token to a user and checks every permission in order.
    ///
    /// Only access tokens are accepted. Blocked users and users who never verified
    /// their phone are rejected regardless of the requested permissions.
    ///
    /// # Arguments
    /// - `permissions` - Requirements that must all hold; empty means any signed-in user
    ///
    /// # Returns
    /// - `Ok(User)` - The authenticated user
    /// - `Err(AuthError::InvalidToken)` - Bad signature, expired, or refresh token
    /// - `Err(AuthError::UserNotInDatabase)` - Token subject no longer exists
    /// - `Err(AuthError::UserBlocked)` - Account is blocked
    /// - `Err(AuthError::AccessDenied)` - Account deactivated
    /// - `Err(AuthError::AccessDenied)` - A permission is not satisfied
    pub async fn require(&self, permissions: &[Permission]) -> Result<User, AppError> {
        let claims = self.tokens.verify(&self.bearer.0, TokenKind::Access)?;
        let user_id = claims.user_id()?;

        let Some(user) = UserRepository::new(self.db).find_by_id(user_id).await? else {
            return Err(AuthError::UserNotInDatabase(user_id).into());
        };

        match user.status {
            UserStatus::Blocked => return Err(AuthError::UserBlocked(user_id).into()),
            UserStatus::Deactivated => {
                return Err(AuthError::AccessDenied(
                    user_id,
                    "Account has been deactivated".to_string(),
                )
                .into())
            }
            UserStatus::PendingSmsVerification => {
                return Err(AuthError::AccessDenied(
                    user_id,
                    "User has not completed phone verification".to_string(),
                )
                .into())
            }
            UserStatus::PendingProfileCompletion | UserStatus::Active => {}
        }

        for permission in permissions {
            match permission {
                Permission::Admin => {
                    if user.role != UserRole::Admin {
                        return Err(AuthError::AccessDenied(
                            user_id,
                            "User attempted an admin action without the admin role".to_string(),
                        )
                        .into());
                    }
                }
                Permission::Driver => {
                    if user.role != UserRole::Driver {
                        return Err(AuthError::AccessDenied(
                            user_id,
                            "User attempted a driver action without the driver role".to_string(),
                        )
                        .into());
                    }
                }
                Permission::ApprovedDriver => {
                    if user.role != UserRole::Driver || user.status != UserStatus::Active {
                        return Err(AuthError::AccessDenied(
                            user_id,
                            "User attempted a driver action without an approved driver profile"
                                .to_string(),
                        )
                        .into());
                    }
                }
            }
        }

        Ok(user)
    }
}
