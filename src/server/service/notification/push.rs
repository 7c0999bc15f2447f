use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;

use crate::server::{
    error::notification::NotificationError,
    service::notification::channel::{Delivery, NotificationChannel},
};

/// HTTP push gateway posting to a configurable endpoint with a server key.
pub struct PushGateway {
    client: reqwest::Client,
    api_url: Option<String>,
    server_key: Option<String>,
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    notification: PushBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
}

#[derive(Serialize)]
struct PushBody<'a> {
    title: &'a str,
    body: &'a str,
}

impl PushGateway {
    pub fn new(client: reqwest::Client, api_url: Option<String>, server_key: Option<String>) -> Self {
        if api_url.is_none() || server_key.is_none() {
            tracing::warn!("Push gateway not configured, push notifications are disabled");
        }
        Self {
            client,
            api_url,
            server_key,
        }
    }
}

#[async_trait]
impl NotificationChannel for PushGateway {
    fn name(&self) -> &'static str {
        "push"
    }

    fn is_enabled(&self) -> bool {
        self.api_url.is_some() && self.server_key.is_some()
    }

    async fn deliver(&self, delivery: &Delivery) -> Result<(), NotificationError> {
        let (Some(api_url), Some(server_key)) = (&self.api_url, &self.server_key) else {
            tracing::info!("Push disabled, dropping '{}'", delivery.title);
            return Err(NotificationError::GatewayDisabled("push"));
        };

        let response = self
            .client
            .post(api_url)
            .header(AUTHORIZATION, format!("key={}", server_key))
            .json(&PushRequest {
                to: &delivery.address,
                notification: PushBody {
                    title: &delivery.title,
                    body: &delivery.body,
                },
                data: delivery.data.as_ref(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                gateway: "push",
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
