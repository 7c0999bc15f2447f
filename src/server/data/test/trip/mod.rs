use crate::server::{
    data::trip::TripRepository,
    model::trip::{Trip, TripSearchParams},
};
use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::TripStatus;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod route_prices;
mod search;
mod set_seats_if_unchanged;

fn search_params(from: Option<&str>, to: Option<&str>, seats_needed: i32) -> TripSearchParams {
    TripSearchParams {
        from_location: from.map(str::to_string),
        to_location: to.map(str::to_string),
        departure_date: None,
        seats_needed,
        page: 0,
        per_page: 20,
    }
}
