//! Request authentication.
//!
//! - `token` - `BearerToken` extractor for the `Authorization` header
//! - `auth` - `AuthGuard` resolving a token to a user and checking permissions

pub mod auth;
pub mod token;

#[cfg(test)]
mod test;
