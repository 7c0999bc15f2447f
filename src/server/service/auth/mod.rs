//! Phone number authentication with SMS one-time passwords.
//!
//! Registration and login both follow a request/verify pair: the request step stores a
//! six digit code and sends it by SMS, the verify step checks it and issues tokens.

pub mod token;

use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::UserStatus;
use rand::Rng;
use sea_orm::DatabaseConnection;

use crate::{
    model::auth::TokenPairDto,
    server::{
        config::OtpPolicy,
        data::{sms_verification::SmsVerificationRepository, user::UserRepository},
        error::{auth::AuthError, AppError},
        model::user::User,
        service::{
            auth::token::{TokenKind, TokenService},
            notification::channel::{Delivery, NotificationChannel},
        },
        util::phone::validate_phone,
    },
};

/// Tokens handed to a client after a successful verification.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: User,
}

impl IssuedTokens {
    pub fn into_dto(self) -> TokenPairDto {
        TokenPairDto {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: "bearer".to_string(),
            expires_in: self.expires_in,
            user: self.user.into_dto(),
        }
    }
}

pub struct AuthService<'a> {
    db: &'a DatabaseConnection,
    tokens: &'a TokenService,
    sms: &'a dyn NotificationChannel,
    policy: OtpPolicy,
}

impl<'a> AuthService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        tokens: &'a TokenService,
        sms: &'a dyn NotificationChannel,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            db,
            tokens,
            sms,
            policy,
        }
    }

    /// Starts registration for a phone number.
    ///
    /// Creates a user in `PendingSmsVerification` status when the phone is unknown and
    /// sends a verification code. A phone that already completed registration is rejected.
    ///
    /// # Arguments
    /// - `phone_number` - Phone number as entered by the client
    ///
    /// # Returns
    /// - `Ok(())` - Code stored and sent
    /// - `Err(AppError::BadRequest)` - Malformed phone or phone already registered
    /// - `Err(AppError)` - Database or SMS gateway failure
    pub async fn request_registration_otp(&self, phone_number: &str) -> Result<(), AppError> {
        let phone = validate_phone(phone_number)?;
        let user_repo = UserRepository::new(self.db);

        match user_repo.find_by_phone(&phone).await? {
            Some(user) if user.status != UserStatus::PendingSmsVerification => {
                return Err(AppError::BadRequest(
                    "User with this phone number already exists".to_string(),
                ));
            }
            Some(_) => {}
            None => {
                user_repo.create_pending(&phone).await?;
            }
        }

        self.issue_otp(&phone).await
    }

    /// Completes registration.
    ///
    /// # Arguments
    /// - `phone_number` - Phone the code was sent to
    /// - `code` - Code entered by the user
    /// - `full_name` - Display name, must not be blank
    ///
    /// # Returns
    /// - `Ok(IssuedTokens)` - The user is now active and logged in
    /// - `Err(AppError::BadRequest)` - Blank name or no pending registration
    /// - `Err(AuthError::InvalidOtp)` - Wrong, expired, or exhausted code
    pub async fn verify_registration(
        &self,
        phone_number: &str,
        code: &str,
        full_name: &str,
    ) -> Result<IssuedTokens, AppError> {
        let phone = validate_phone(phone_number)?;
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::BadRequest("Full name is required".to_string()));
        }

        let user_repo = UserRepository::new(self.db);
        let user = user_repo
            .find_by_phone(&phone)
            .await?
            .filter(|user| user.status == UserStatus::PendingSmsVerification)
            .ok_or_else(|| {
                AppError::BadRequest("No pending registration for this phone number".to_string())
            })?;

        self.verify_code(&phone, code).await?;

        let user = user_repo.activate(user.id, full_name).await?;
        tracing::info!("User {} completed registration", user.id);

        self.issue_tokens(user)
    }

    /// Sends a login code to a registered phone.
    ///
    /// # Returns
    /// - `Ok(())` - Code stored and sent
    /// - `Err(AppError::NotFound)` - Phone not registered or registration unfinished
    /// - `Err(AuthError::UserBlocked)` - Account is blocked
    pub async fn request_login_otp(&self, phone_number: &str) -> Result<(), AppError> {
        let phone = validate_phone(phone_number)?;
        self.find_registered(&phone).await?;

        self.issue_otp(&phone).await
    }

    /// Verifies a login code and issues tokens.
    pub async fn verify_login(
        &self,
        phone_number: &str,
        code: &str,
    ) -> Result<IssuedTokens, AppError> {
        let phone = validate_phone(phone_number)?;
        let user = self.find_registered(&phone).await?;

        self.verify_code(&phone, code).await?;

        self.issue_tokens(user)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// # Returns
    /// - `Ok((String, i64))` - New access token and its lifetime in seconds
    /// - `Err(AuthError)` - Invalid refresh token, unknown or blocked user
    pub async fn refresh(&self, refresh_token: &str) -> Result<(String, i64), AppError> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let user_id = claims.user_id()?;

        let user = UserRepository::new(self.db)
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotInDatabase(user_id))?;
        ensure_can_sign_in(&user)?;

        let access_token = self.tokens.issue(user.id, user.role, TokenKind::Access)?;
        Ok((access_token, self.tokens.access_ttl_seconds()))
    }

    async fn find_registered(&self, phone: &str) -> Result<User, AppError> {
        let user = UserRepository::new(self.db)
            .find_by_phone(phone)
            .await?
            .filter(|user| user.status != UserStatus::PendingSmsVerification)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        ensure_can_sign_in(&user)?;

        Ok(user)
    }

    async fn issue_otp(&self, phone: &str) -> Result<(), AppError> {
        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(self.policy.expire_minutes);

        SmsVerificationRepository::new(self.db)
            .create(phone, &code, expires_at)
            .await?;

        self.sms
            .deliver(&Delivery {
                address: phone.to_string(),
                title: "AutoPort verification".to_string(),
                body: format!(
                    "AutoPort verification code: {}. Valid for {} minutes.",
                    code, self.policy.expire_minutes
                ),
                data: None,
            })
            .await?;

        Ok(())
    }

    /// Checks a code against the newest active verification for `phone`.
    ///
    /// Wrong codes consume an attempt; once `max_attempts` is reached the code is dead
    /// even if the right value is entered afterwards.
    async fn verify_code(&self, phone: &str, code: &str) -> Result<(), AppError> {
        let repo = SmsVerificationRepository::new(self.db);

        let Some(verification) = repo.find_active(phone, Utc::now()).await? else {
            return Err(AuthError::InvalidOtp.into());
        };

        if verification.attempts >= self.policy.max_attempts {
            return Err(AuthError::InvalidOtp.into());
        }

        if verification.code != code.trim() {
            repo.increment_attempts(verification).await?;
            return Err(AuthError::InvalidOtp.into());
        }

        repo.mark_used(verification.id).await?;
        Ok(())
    }

    fn issue_tokens(&self, user: User) -> Result<IssuedTokens, AppError> {
        Ok(IssuedTokens {
            access_token: self.tokens.issue(user.id, user.role, TokenKind::Access)?,
            refresh_token: self.tokens.issue(user.id, user.role, TokenKind::Refresh)?,
            expires_in: self.tokens.access_ttl_seconds(),
            user,
        })
    }
}

fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000))
}

/// Rejects accounts an administrator blocked or their owner deactivated.
fn ensure_can_sign_in(user: &User) -> Result<(), AuthError> {
    match user.status {
        UserStatus::Blocked => Err(AuthError::UserBlocked(user.id)),
        UserStatus::Deactivated => Err(AuthError::AccessDenied(
            user.id,
            "Account has been deactivated".to_string(),
        )),
        _ => Ok(()),
    }
}
