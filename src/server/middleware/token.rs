use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::server::error::{auth::AuthError, AppError};

/// Raw JWT taken from an `Authorization: Bearer <token>` header.
///
/// Extraction only checks the header shape; signature and expiry are verified by
/// `AuthGuard`.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        parse_bearer(header)
            .map(|token| BearerToken(token.to_string()))
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}

/// Splits the scheme off an authorization header value, case-insensitively.
fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::parse_bearer;

    #[test]
    fn accepts_bearer_scheme_in_any_case() {
        assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("bearer abc.def"), Some("abc.def"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("abc.def"), None);
    }
}
