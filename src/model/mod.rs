//! Request and response DTOs for the `/api/v1` surface.
//!
//! Every type here derives `ToSchema` so it appears in the generated OpenAPI document.

pub mod api;
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
