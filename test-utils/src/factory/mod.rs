//! Factory methods for creating test data.
//!
//! Each table has a `*Factory` builder for customization and a `create_*` convenience
//! function for quick default creation. Factories take the ids of the rows they reference,
//! and `helpers` wires common dependency chains together.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let driver = factory::user::create_driver(db).await?;
//! let car = factory::car::create_car(db, driver.id).await?;
//! let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
//!     .seats(2)
//!     .build()
//!     .await?;
//! ```
//!
//! # Available Factories
//!
//! - `user` - Passengers, drivers and admins
//! - `car` - Cars owned by a driver
//! - `trip` - Trips published by a driver
//! - `booking` - Seat bookings on a trip
//! - `negotiation` - Negotiation chains with their opening offer
//! - `notification` - Notification records
//! - `emergency_contact` - Emergency contacts of a user
//! - `user_settings` - Notification and privacy settings
//! - `helpers` - Convenience methods for creating entities with dependencies

pub mod booking;
pub mod car;
pub mod emergency_contact;
pub mod helpers;
pub mod negotiation;
pub mod notification;
pub mod trip;
pub mod user;
pub mod user_settings;

pub use booking::create_booking;
pub use car::create_car;
pub use trip::create_trip;
pub use user::{create_admin, create_driver, create_user};
