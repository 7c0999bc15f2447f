pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_user_table;
mod m20260105_000002_create_sms_verification_table;
mod m20260105_000003_create_car_table;
mod m20260105_000004_create_trip_table;
mod m20260105_000005_create_booking_table;
mod m20260105_000006_create_price_negotiation_table;
mod m20260105_000007_create_negotiation_offer_table;
mod m20260105_000008_create_auto_accept_rule_table;
mod m20260105_000009_create_notification_table;
mod m20260105_000010_create_user_settings_table;
mod m20260105_000011_create_travel_preference_table;
mod m20260105_000012_create_message_thread_table;
mod m20260105_000013_create_thread_participant_table;
mod m20260105_000014_create_message_table;
mod m20260105_000015_create_rating_table;
mod m20260105_000016_create_emergency_contact_table;
mod m20260105_000017_create_emergency_alert_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_user_table::Migration),
            Box::new(m20260105_000002_create_sms_verification_table::Migration),
            Box::new(m20260105_000003_create_car_table::Migration),
            Box::new(m20260105_000004_create_trip_table::Migration),
            Box::new(m20260105_000005_create_booking_table::Migration),
            Box::new(m20260105_000006_create_price_negotiation_table::Migration),
            Box::new(m20260105_000007_create_negotiation_offer_table::Migration),
            Box::new(m20260105_000008_create_auto_accept_rule_table::Migration),
            Box::new(m20260105_000009_create_notification_table::Migration),
            Box::new(m20260105_000010_create_user_settings_table::Migration),
            Box::new(m20260105_000011_create_travel_preference_table::Migration),
            Box::new(m20260105_000012_create_message_thread_table::Migration),
            Box::new(m20260105_000013_create_thread_participant_table::Migration),
            Box::new(m20260105_000014_create_message_table::Migration),
            Box::new(m20260105_000015_create_rating_table::Migration),
            Box::new(m20260105_000016_create_emergency_contact_table::Migration),
            Box::new(m20260105_000017_create_emergency_alert_table::Migration),
        ]
    }
}
