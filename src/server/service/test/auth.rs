use std::sync::Arc;

use chrono::Duration;
use entity::sea_orm_active_enums::UserStatus;

use crate::server::{
    config::OtpPolicy,
    data::user::UserRepository,
    error::{auth::AuthError, AppError},
    service::{
        auth::{
            token::{TokenKind, TokenService},
            AuthService,
        },
        notification::channel::fake::RecordingChannel,
    },
};
use test_utils::{builder::TestBuilder, factory};

const PHONE: &str = "+998901234567";

fn tokens() -> TokenService {
    TokenService::with_secret("auth-secret", Duration::minutes(30), Duration::days(7))
}

fn policy() -> OtpPolicy {
    OtpPolicy {
        expire_minutes: 5,
        max_attempts: 3,
    }
}

/// Reads the six digit code from the most recent SMS.
fn last_code(sms: &Arc<RecordingChannel>) -> String {
    let sent = sms.sent();
    let body = &sent.last().expect("an SMS was sent").body;
    body.chars().filter(char::is_ascii_digit).take(6).collect()
}

/// Tests the full registration flow from code request to verified account.
///
/// Expected: Ok with tokens whose subject is the new user, who is active and verified
#[tokio::test]
async fn registration_activates_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();
    let sms = RecordingChannel::new("sms");
    let auth = AuthService::new(db, &tokens, &*sms, policy());

    auth.request_registration_otp(PHONE).await?;
    assert_eq!(sms.sent()[0].address, PHONE);

    let issued = auth
        .verify_registration(PHONE, &last_code(&sms), " Aziz Karimov ")
        .await?;

    assert_eq!(issued.user.status, UserStatus::Active);
    assert!(issued.user.is_phone_verified);
    assert_eq!(issued.user.full_name.as_deref(), Some("Aziz Karimov"));

    let claims = tokens.verify(&issued.access_token, TokenKind::Access)?;
    assert_eq!(claims.user_id()?, issued.user.id);
    assert!(tokens
        .verify(&issued.refresh_token, TokenKind::Refresh)
        .is_ok());

    Ok(())
}

/// Tests wrong codes burn attempts until even the right code is refused.
///
/// Expected: Err(AuthError::InvalidOtp) for the correct code after three wrong ones
#[tokio::test]
async fn exhausted_code_is_rejected() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();
    let sms = RecordingChannel::new("sms");
    let auth = AuthService::new(db, &tokens, &*sms, policy());

    auth.request_registration_otp(PHONE).await?;
    let code = last_code(&sms);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..3 {
        let result = auth.verify_registration(PHONE, wrong, "Aziz").await;
        assert!(matches!(
            result,
            Err(AppError::AuthErr(AuthError::InvalidOtp))
        ));
    }

    let result = auth.verify_registration(PHONE, &code, "Aziz").await;
    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::InvalidOtp))
    ));

    Ok(())
}

/// Tests a phone that finished registration cannot register again.
///
/// Expected: Err(AppError::BadRequest) and no SMS sent
#[tokio::test]
async fn registered_phone_cannot_reregister() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();
    let sms = RecordingChannel::new("sms");
    let auth = AuthService::new(db, &tokens, &*sms, policy());

    factory::user::UserFactory::new(db)
        .phone_number(PHONE)
        .build()
        .await?;

    let result = auth.request_registration_otp(PHONE).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(sms.sent().is_empty());

    Ok(())
}

/// Tests login for an unknown phone.
///
/// Expected: Err(AppError::NotFound)
#[tokio::test]
async fn login_requires_registration() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();
    let sms = RecordingChannel::new("sms");
    let auth = AuthService::new(db, &tokens, &*sms, policy());

    let result = auth.request_login_otp(PHONE).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

/// Tests blocked users cannot request a login code.
///
/// Expected: Err(AuthError::UserBlocked)
#[tokio::test]
async fn blocked_user_cannot_log_in() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();
    let sms = RecordingChannel::new("sms");
    let auth = AuthService::new(db, &tokens, &*sms, policy());

    factory::user::UserFactory::new(db)
        .phone_number(PHONE)
        .status(UserStatus::Blocked)
        .build()
        .await?;

    let result = auth.request_login_otp(PHONE).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::UserBlocked(_)))
    ));

    Ok(())
}

/// Tests login with a valid code and a refresh afterwards.
///
/// Expected: Ok with a refreshed access token for the same user
#[tokio::test]
async fn login_then_refresh() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let tokens = tokens();
    let sms = RecordingChannel::new("sms");
    let auth = AuthService::new(db, &tokens, &*sms, policy());

    let user = factory::user::UserFactory::new(db)
        .phone_number(PHONE)
        .build()
        .await?;

    auth.request_login_otp(PHONE).await?;
    let issued = auth.verify_login(PHONE, &last_code(&sms)).await?;
    assert_eq!(issued.user.id, user.id);

    let (access_token, expires_in) = auth.refresh(&issued.refresh_token).await?;
    let claims = tokens.verify(&access_token, TokenKind::Access)?;
    assert_eq!(claims.user_id()?, user.id);
    assert_eq!(expires_in, 30 * 60);

    let stored = UserRepository::new(db).find_by_id(user.id).await?.unwrap();
    assert_eq!(stored.status, UserStatus::Active);

    Ok(())
}
