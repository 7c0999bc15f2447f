use entity::prelude::*;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with customizable database schemas.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::builder::TestBuilder;
/// use entity::prelude::{User, UserSettings};
///
/// let test = TestBuilder::new()
///     .with_table(User)
///     .with_table(UserSettings)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    /// CREATE TABLE statements executed in insertion order during `build()`.
    tables: Vec<TableCreateStatement>,
}

impl TestBuilder {
    /// Creates a new test builder with no tables configured.
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds an entity table to the test database schema.
    ///
    /// Generates a CREATE TABLE statement from the entity using SQLite syntax. Tables with
    /// foreign keys should be added after the tables they reference.
    ///
    /// # Arguments
    /// - `entity` - SeaORM entity to create a table for
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Adds the tables every authenticated flow touches.
    ///
    /// - User
    /// - UserSettings
    /// - SmsVerification
    /// - Notification
    pub fn with_user_tables(self) -> Self {
        self.with_table(User)
            .with_table(UserSettings)
            .with_table(SmsVerification)
            .with_table(Notification)
    }

    /// Adds the tables required for trip, booking and negotiation operations.
    ///
    /// Includes everything from `with_user_tables()` plus cars, trips, bookings, the
    /// negotiation chain tables and the trip message threads.
    pub fn with_trip_tables(self) -> Self {
        self.with_user_tables()
            .with_table(Car)
            .with_table(Trip)
            .with_table(Booking)
            .with_table(PriceNegotiation)
            .with_table(NegotiationOffer)
            .with_table(AutoAcceptRule)
            .with_table(MessageThread)
            .with_table(ThreadParticipant)
            .with_table(Message)
    }

    /// Adds every table of the schema.
    pub fn with_all_tables(self) -> Self {
        self.with_trip_tables()
            .with_table(Rating)
            .with_table(EmergencyContact)
            .with_table(EmergencyAlert)
            .with_table(TravelPreference)
    }

    /// Builds and initializes the test context with configured tables.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Test context with database and tables ready
    /// - `Err(TestError::Database)` - Failed to connect to database or create tables
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut setup = TestContext::new();

        setup.with_tables(self.tables).await?;

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
