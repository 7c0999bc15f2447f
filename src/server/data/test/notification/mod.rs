use crate::server::data::notification::NotificationRepository;
use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::{DeliveryChannel, NotificationStatus};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod get_due;
mod inbox;
mod retry_failed;
