//! AutoPort Test Utils
//!
//! Provides shared testing utilities for the AutoPort server. The crate builds in-memory
//! SQLite databases from the entity definitions and offers factories for the rows most
//! tests need (users, cars, trips, bookings, negotiations, notifications).
//!
//! # Overview
//!
//! - **TestBuilder**: Fluent builder for configuring which tables exist
//! - **TestContext**: Test environment holding the database connection
//! - **TestError**: Error types that can occur during test setup
//! - **factory**: Builders that insert rows with sensible defaults
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory};
//!
//! #[tokio::test]
//! async fn books_a_seat() -> Result<(), TestError> {
//!     let test = TestBuilder::new().with_trip_tables().build().await?;
//!     let db = test.db.as_ref().unwrap();
//!
//!     let (driver, car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
//!     // Perform database operations...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
