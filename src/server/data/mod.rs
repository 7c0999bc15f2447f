//! Database repository layer for all domain entities.
//!
//! This module contains repository structs that handle database operations (CRUD) for each
//! domain in the application. Repositories are generic over `ConnectionTrait` so services
//! can run them against the pool or inside a transaction, and they convert entity models
//! to domain models at the boundary.

pub mod booking;
pub mod car;
pub mod emergency;
pub mod message;
pub mod negotiation;
pub mod notification;
pub mod preference;
pub mod rating;
pub mod sms_verification;
pub mod trip;
pub mod user;

#[cfg(test)]
mod test;
