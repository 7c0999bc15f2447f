use async_trait::async_trait;
use serde::Serialize;

use crate::server::{
    error::notification::NotificationError,
    service::notification::channel::{Delivery, NotificationChannel},
    util::phone::digits_only,
};

/// Eskiz-style HTTP SMS gateway.
///
/// Without an API token the gateway runs in development mode: messages are written to
/// the log and reported as delivered.
pub struct SmsGateway {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct SendSmsRequest<'a> {
    mobile_phone: String,
    message: &'a str,
    from: &'a str,
}

impl SmsGateway {
    pub fn new(
        client: reqwest::Client,
        api_url: String,
        token: Option<String>,
        from: String,
    ) -> Self {
        if token.is_none() {
            tracing::warn!("SMS_API_TOKEN not set, SMS messages will only be logged");
        }
        Self {
            client,
            api_url,
            token,
            from,
        }
    }
}

#[async_trait]
impl NotificationChannel for SmsGateway {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn deliver(&self, delivery: &Delivery) -> Result<(), NotificationError> {
        let Some(token) = &self.token else {
            tracing::info!("SMS to {}: {}", delivery.address, delivery.body);
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/message/sms/send", self.api_url))
            .bearer_auth(token)
            .json(&SendSmsRequest {
                mobile_phone: digits_only(&delivery.address),
                message: &delivery.body,
                from: &self.from,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                gateway: "sms",
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("SMS sent to {}", delivery.address);
        Ok(())
    }
}
