use chrono::Duration;
use entity::sea_orm_active_enums::{UserRole, UserStatus};

use crate::server::{
    error::{auth::AuthError, AppError},
    middleware::{
        auth::{AuthGuard, Permission},
        token::BearerToken,
    },
    service::auth::token::{TokenKind, TokenService},
};
use test_utils::{builder::TestBuilder, factory};

mod require;

fn tokens() -> TokenService {
    TokenService::with_secret("guard-secret", Duration::minutes(30), Duration::days(7))
}

fn bearer_for(tokens: &TokenService, user: &entity::user::Model) -> BearerToken {
    BearerToken(
        tokens
            .issue(user.id, user.role, TokenKind::Access)
            .unwrap(),
    )
}
