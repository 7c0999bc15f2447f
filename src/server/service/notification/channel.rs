//! Delivery channel abstraction.
//!
//! Each outbound integration implements `NotificationChannel`. The dispatcher only knows
//! this trait, which lets tests swap in a recording channel.

use std::sync::Arc;

use async_trait::async_trait;
use entity::sea_orm_active_enums::DeliveryChannel;

use crate::server::{error::notification::NotificationError, model::preference::UserSettings};

/// A single message ready to hand to a gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Phone number, email address, or push token depending on the channel
    pub address: String,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short gateway name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether the gateway is configured to deliver anything.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Sends one message.
    ///
    /// # Returns
    /// - `Ok(())` - The provider accepted the message
    /// - `Err(NotificationError)` - Delivery failed and should be retried later
    async fn deliver(&self, delivery: &Delivery) -> Result<(), NotificationError>;
}

/// The set of gateways available to the dispatcher and the OTP flow.
#[derive(Clone)]
pub struct Gateways {
    pub sms: Arc<dyn NotificationChannel>,
    pub push: Arc<dyn NotificationChannel>,
    pub email: Arc<dyn NotificationChannel>,
}

impl Gateways {
    /// Gateway serving `channel`, `None` for in-app records.
    pub fn for_channel(&self, channel: DeliveryChannel) -> Option<&dyn NotificationChannel> {
        match channel {
            DeliveryChannel::Sms => Some(self.sms.as_ref()),
            DeliveryChannel::Push => Some(self.push.as_ref()),
            DeliveryChannel::Email => Some(self.email.as_ref()),
            DeliveryChannel::InApp => None,
        }
    }

    /// Whether records on `channel` can leave the server. The inbox is always available.
    pub fn is_enabled(&self, channel: DeliveryChannel) -> bool {
        self.for_channel(channel)
            .is_none_or(|gateway| gateway.is_enabled())
    }

    /// The user's switches with every channel lacking a configured gateway turned off.
    pub fn restrict(&self, settings: &UserSettings) -> UserSettings {
        UserSettings {
            push_notifications: settings.push_notifications
                && self.is_enabled(DeliveryChannel::Push),
            sms_notifications: settings.sms_notifications && self.is_enabled(DeliveryChannel::Sms),
            email_notifications: settings.email_notifications
                && self.is_enabled(DeliveryChannel::Email),
            ..*settings
        }
    }
}

#[cfg(test)]
pub mod fake {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };

    use async_trait::async_trait;

    use super::{Delivery, Gateways, NotificationChannel};
    use crate::server::error::notification::NotificationError;

    /// Channel that records deliveries in memory and can be told to fail.
    pub struct RecordingChannel {
        name: &'static str,
        enabled: AtomicBool,
        fail_for: Mutex<Vec<String>>,
        sent: Mutex<Vec<Delivery>>,
    }

    impl RecordingChannel {
        pub fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                enabled: AtomicBool::new(true),
                fail_for: Mutex::new(Vec::new()),
                sent: Mutex::new(Vec::new()),
            })
        }

        /// Behaves like a gateway with no credentials configured.
        pub fn disable(&self) {
            self.enabled.store(false, Ordering::SeqCst);
        }

        /// Makes every delivery to `address` fail.
        pub fn fail_for(&self, address: &str) {
            self.fail_for.lock().unwrap().push(address.to_string());
        }

        pub fn sent(&self) -> Vec<Delivery> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }

        async fn deliver(&self, delivery: &Delivery) -> Result<(), NotificationError> {
            if !self.is_enabled() {
                return Err(NotificationError::GatewayDisabled(self.name));
            }
            if self.fail_for.lock().unwrap().contains(&delivery.address) {
                return Err(NotificationError::Rejected {
                    gateway: self.name,
                    status: 500,
                    body: "simulated failure".to_string(),
                });
            }
            self.sent.lock().unwrap().push(delivery.clone());
            Ok(())
        }
    }

    /// Recording channels for every gateway, returned alongside the `Gateways` handle.
    pub struct FakeGateways {
        pub sms: Arc<RecordingChannel>,
        pub push: Arc<RecordingChannel>,
        pub email: Arc<RecordingChannel>,
    }

    impl FakeGateways {
        pub fn new() -> Self {
            Self {
                sms: RecordingChannel::new("sms"),
                push: RecordingChannel::new("push"),
                email: RecordingChannel::new("email"),
            }
        }

        pub fn gateways(&self) -> Gateways {
            Gateways {
                sms: self.sms.clone(),
                push: self.push.clone(),
                email: self.email.clone(),
            }
        }
    }
}
