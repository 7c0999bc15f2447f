//! HTTP handlers for the `/api/v1` surface.
//!
//! Each handler authenticates through `AuthGuard`, converts the request DTO into service
//! params, calls one service method, and converts the result back to a DTO. Every handler
//! carries a `#[utoipa::path]` annotation so the router can assemble the OpenAPI document.

pub mod admin;
pub mod auth;
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
