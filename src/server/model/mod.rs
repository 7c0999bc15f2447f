//! Server-side domain models and parameter types.
//!
//! This module contains domain models used throughout the service layer, representing
//! business entities and operation parameters. Domain models are converted from entity
//! models at the repository boundary and transformed to DTOs at the controller boundary.

pub mod booking;
pub mod car;
pub mod emergency;
pub mod message;
pub mod negotiation;
pub mod notification;
pub mod preference;
pub mod rating;
pub mod trip;
pub mod user;
