//! Trip factory for creating test trip entities.

use chrono::{DateTime, Duration, Utc};
use entity::sea_orm_active_enums::TripStatus;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test trips.
///
/// # Example
///
/// ```rust,ignore
/// let trip = TripFactory::new(&db, driver.id, car.id)
///     .price(Decimal::new(50_000, 0))
///     .seats(1)
///     .build()
///     .await?;
/// ```
pub struct TripFactory<'a> {
    db: &'a DatabaseConnection,
    driver_id: i32,
    car_id: i32,
    from_location: String,
    to_location: String,
    departure_datetime: DateTime<Utc>,
    price_per_seat: Decimal,
    total_seats_offered: i32,
    available_seats: Option<i32>,
    status: TripStatus,
    price_negotiable: bool,
}

impl<'a> TripFactory<'a> {
    /// Creates a new TripFactory with default values.
    ///
    /// Defaults:
    /// - route: `Tashkent` to `Samarkand`, departing one day from now
    /// - price_per_seat: `100000`
    /// - total and available seats: `3`
    /// - status: `Scheduled`, price_negotiable: `true`
    pub fn new(db: &'a DatabaseConnection, driver_id: i32, car_id: i32) -> Self {
        Self {
            db,
            driver_id,
            car_id,
            from_location: "Tashkent".to_string(),
            to_location: "Samarkand".to_string(),
            departure_datetime: Utc::now() + Duration::days(1),
            price_per_seat: Decimal::new(100_000, 0),
            total_seats_offered: 3,
            available_seats: None,
            status: TripStatus::Scheduled,
            price_negotiable: true,
        }
    }

    pub fn route(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from_location = from.into();
        self.to_location = to.into();
        self
    }

    pub fn departure(mut self, departure: DateTime<Utc>) -> Self {
        self.departure_datetime = departure;
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price_per_seat = price;
        self
    }

    /// Sets the seats offered; available seats follow unless set explicitly.
    pub fn seats(mut self, seats: i32) -> Self {
        self.total_seats_offered = seats;
        self
    }

    pub fn available_seats(mut self, available: i32) -> Self {
        self.available_seats = Some(available);
        self
    }

    pub fn status(mut self, status: TripStatus) -> Self {
        self.status = status;
        self
    }

    pub fn price_negotiable(mut self, negotiable: bool) -> Self {
        self.price_negotiable = negotiable;
        self
    }

    /// Builds and inserts the trip entity into the database.
    pub async fn build(self) -> Result<entity::trip::Model, DbErr> {
        let now = Utc::now();
        entity::trip::ActiveModel {
            driver_id: ActiveValue::Set(self.driver_id),
            car_id: ActiveValue::Set(self.car_id),
            from_location: ActiveValue::Set(self.from_location),
            to_location: ActiveValue::Set(self.to_location),
            departure_datetime: ActiveValue::Set(self.departure_datetime),
            estimated_arrival_datetime: ActiveValue::Set(None),
            price_per_seat: ActiveValue::Set(self.price_per_seat),
            total_seats_offered: ActiveValue::Set(self.total_seats_offered),
            available_seats: ActiveValue::Set(
                self.available_seats.unwrap_or(self.total_seats_offered),
            ),
            status: ActiveValue::Set(self.status),
            additional_info: ActiveValue::Set(None),
            is_instant_booking: ActiveValue::Set(true),
            price_negotiable: ActiveValue::Set(self.price_negotiable),
            allow_smoking: ActiveValue::Set(false),
            allow_pets: ActiveValue::Set(false),
            allow_music: ActiveValue::Set(true),
            female_only: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a scheduled trip with default values.
pub async fn create_trip(
    db: &DatabaseConnection,
    driver_id: i32,
    car_id: i32,
) -> Result<entity::trip::Model, DbErr> {
    TripFactory::new(db, driver_id, car_id).build().await
}
