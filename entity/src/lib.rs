//! SeaORM entity models for the AutoPort database schema.

pub mod prelude;

pub mod auto_accept_rule;
pub mod booking;
pub mod car;
pub mod emergency_alert;
pub mod emergency_contact;
pub mod message;
pub mod message_thread;
pub mod negotiation_offer;
pub mod notification;
pub mod price_negotiation;
pub mod rating;
pub mod sea_orm_active_enums;
pub mod sms_verification;
pub mod thread_participant;
pub mod travel_preference;
pub mod trip;
pub mod user;
pub mod user_settings;
