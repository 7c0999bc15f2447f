use crate::server::data::booking::BookingRepository;
use entity::sea_orm_active_enums::BookingStatus;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod find_shared_trip_booking;
mod get_for_driver_paginated;
