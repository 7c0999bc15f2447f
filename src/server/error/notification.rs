use thiserror::Error;

/// Failures raised by delivery gateways.
///
/// The dispatcher stores the rendered message in the notification's `last_error` column
/// and retries on a later tick.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The gateway is not configured and cannot deliver.
    #[error("{0} gateway is disabled")]
    GatewayDisabled(&'static str),

    /// The recipient has no address for this channel (no phone, email, or push token).
    #[error("Recipient has no {0} address")]
    MissingAddress(&'static str),

    /// The upstream provider answered with a non-success status.
    #[error("{gateway} provider responded with status {status}: {body}")]
    Rejected {
        gateway: &'static str,
        status: u16,
        body: String,
    },

    /// Transport error while calling an HTTP provider.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// SMTP transport error.
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The email message could not be assembled (bad address or header).
    #[error("Failed to build email: {0}")]
    Email(String),
}
