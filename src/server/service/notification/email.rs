use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::server::{
    config::Config,
    error::{config::ConfigError, notification::NotificationError},
    service::notification::channel::{Delivery, NotificationChannel},
};

/// SMTP email gateway using STARTTLS.
///
/// Disabled when no SMTP credentials are configured.
pub struct EmailGateway {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl EmailGateway {
    /// Builds the SMTP relay from configuration.
    ///
    /// # Returns
    /// - `Ok(EmailGateway)` - Gateway, possibly in disabled mode
    /// - `Err(ConfigError)` - Invalid sender address or relay host
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let from: Mailbox = config
            .smtp_from_email
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar {
                name: "SMTP_FROM_EMAIL".to_string(),
                value: config.smtp_from_email.clone(),
            })?;

        let transport = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => Some(
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(|e| ConfigError::Invalid(format!("SMTP relay: {}", e)))?
                    .port(config.smtp_port)
                    .credentials(Credentials::new(username.clone(), password.clone()))
                    .build(),
            ),
            _ => {
                tracing::warn!("SMTP credentials not set, email notifications are disabled");
                None
            }
        };

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl NotificationChannel for EmailGateway {
    fn name(&self) -> &'static str {
        "email"
    }

    fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    async fn deliver(&self, delivery: &Delivery) -> Result<(), NotificationError> {
        let Some(transport) = &self.transport else {
            tracing::info!("Email disabled, dropping '{}'", delivery.title);
            return Err(NotificationError::GatewayDisabled("email"));
        };

        let to: Mailbox = delivery
            .address
            .parse()
            .map_err(|e| NotificationError::Email(format!("{}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&delivery.title)
            .header(ContentType::TEXT_PLAIN)
            .body(delivery.body.clone())
            .map_err(|e| NotificationError::Email(e.to_string()))?;

        transport.send(message).await?;
        Ok(())
    }
}
