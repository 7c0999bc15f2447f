//! Shared helper utilities for factory methods.

use sea_orm::{DatabaseConnection, DbErr};

static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Gets the next unique counter value for test data.
///
/// Used to derive unique phone numbers, license plates and names across factories.
///
/// # Returns
/// - `u64` - Next unique counter value
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Creates a scheduled trip together with its driver and approved car.
///
/// # Arguments
/// - `db` - Database connection
///
/// # Returns
/// - `Ok((driver, car, trip))` - Tuple of created entities
/// - `Err(DbErr)` - Database error during creation
pub async fn create_trip_with_dependencies(
    db: &DatabaseConnection,
) -> Result<(entity::user::Model, entity::car::Model, entity::trip::Model), DbErr> {
    let driver = crate::factory::user::create_driver(db).await?;
    let car = crate::factory::car::create_car(db, driver.id).await?;
    let trip = crate::factory::trip::create_trip(db, driver.id, car.id).await?;

    Ok((driver, car, trip))
}

/// Creates a trip with one passenger holding a confirmed single-seat booking.
///
/// The trip's available seats already account for the booking.
///
/// # Returns
/// - `Ok((driver, passenger, trip, booking))` - Tuple of created entities
/// - `Err(DbErr)` - Database error during creation
pub async fn create_booked_trip(
    db: &DatabaseConnection,
) -> Result<
    (
        entity::user::Model,
        entity::user::Model,
        entity::trip::Model,
        entity::booking::Model,
    ),
    DbErr,
> {
    let driver = crate::factory::user::create_driver(db).await?;
    let car = crate::factory::car::create_car(db, driver.id).await?;
    let trip = crate::factory::trip::TripFactory::new(db, driver.id, car.id)
        .seats(3)
        .available_seats(2)
        .build()
        .await?;
    let passenger = crate::factory::user::create_user(db).await?;
    let booking = crate::factory::booking::create_booking(db, trip.id, passenger.id).await?;

    Ok((driver, passenger, trip, booking))
}
