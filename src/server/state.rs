//! Application state shared across all request handlers.
//!
//! This module defines the `AppState` struct which holds the shared resources needed by
//! the controllers. The state is initialized once during startup and then cloned for each
//! request handler through Axum's state extraction.
//!
//! The state includes:
//! - Database connection pool for data persistence
//! - Token service for issuing and verifying JWTs
//! - Delivery gateways used for OTP codes
//! - OTP policy (code lifetime and attempt limit)

use sea_orm::DatabaseConnection;

use crate::server::{
    config::OtpPolicy,
    service::{auth::token::TokenService, notification::channel::Gateways},
};

/// Application state containing shared resources and dependencies.
///
/// All fields use cheap-to-clone types:
/// - `DatabaseConnection` is a connection pool (clones share the pool)
/// - `TokenService` holds pre-built signing keys
/// - `Gateways` holds `Arc`s to the channel implementations
/// - `OtpPolicy` is `Copy`
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing persistent storage.
    pub db: DatabaseConnection,

    /// Issues and verifies access and refresh tokens.
    pub tokens: TokenService,

    /// SMS, push, and email gateways.
    ///
    /// Controllers only use the SMS gateway directly (for OTP codes); every other
    /// outbound message goes through the notification queue and the dispatcher job.
    pub gateways: Gateways,

    /// Lifetime and attempt limit applied to verification codes.
    pub otp: OtpPolicy,
}

impl AppState {
    /// Creates a new application state with the provided dependencies.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `tokens` - JWT token service
    /// - `gateways` - Delivery gateways
    /// - `otp` - Verification code policy
    ///
    /// # Returns
    /// - `AppState` - Initialized application state ready for use
    pub fn new(
        db: DatabaseConnection,
        tokens: TokenService,
        gateways: Gateways,
        otp: OtpPolicy,
    ) -> Self {
        Self {
            db,
            tokens,
            gateways,
            otp,
        }
    }
}
