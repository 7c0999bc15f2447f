use std::str::FromStr;

use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_SMS_API_URL: &str = "https://notify.eskiz.uz/api";
const DEFAULT_SMS_FROM: &str = "4546";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_FROM_EMAIL: &str = "noreply@autoport.uz";
const DEFAULT_DISPATCH_CRON: &str = "*/15 * * * * *";
const DEFAULT_EXPIRY_CRON: &str = "0 * * * * *";

/// One-time password issuance policy.
#[derive(Clone, Copy, Debug)]
pub struct OtpPolicy {
    /// Minutes until an issued code expires.
    pub expire_minutes: i64,
    /// Verification attempts allowed before the code is locked.
    pub max_attempts: i32,
}

pub struct Config {
    pub database_url: String,
    pub bind_address: String,

    pub jwt_secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,

    pub otp_expire_minutes: i64,
    pub otp_max_attempts: i32,
    /// Seconds until one request of the per-IP OTP quota is replenished
    pub otp_rate_per_second: u64,
    /// Requests a single IP may burst before the OTP limiter kicks in
    pub otp_rate_burst: u32,

    pub sms_api_url: String,
    pub sms_api_token: Option<String>,
    pub sms_from: String,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from_email: String,

    pub push_api_url: Option<String>,
    pub push_server_key: Option<String>,

    pub cors_origins: Vec<String>,

    pub notification_dispatch_cron: String,
    pub negotiation_expiry_cron: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// `DATABASE_URL` and `JWT_SECRET_KEY` are required, every other variable falls back
    /// to a default. Gateways whose credentials are absent are started in disabled mode.
    ///
    /// # Returns
    /// - `Ok(Config)` - Configuration loaded from the environment
    /// - `Err(AppError::ConfigErr)` - A required variable is missing or a value fails to parse
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_address: or_default("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),

            jwt_secret_key: required("JWT_SECRET_KEY")?,
            access_token_expire_minutes: parsed("JWT_ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,
            refresh_token_expire_days: parsed("JWT_REFRESH_TOKEN_EXPIRE_DAYS", 7)?,

            otp_expire_minutes: parsed("OTP_EXPIRE_MINUTES", 5)?,
            otp_max_attempts: parsed("OTP_MAX_ATTEMPTS", 3)?,
            otp_rate_per_second: parsed("OTP_RATE_LIMIT_PER_SECOND", 12)?,
            otp_rate_burst: parsed("OTP_RATE_LIMIT_BURST", 5)?,

            sms_api_url: url_or_default("SMS_API_URL", DEFAULT_SMS_API_URL)?,
            sms_api_token: optional("SMS_API_TOKEN"),
            sms_from: or_default("SMS_FROM", DEFAULT_SMS_FROM),

            smtp_host: or_default("SMTP_HOST", DEFAULT_SMTP_HOST),
            smtp_port: parsed("SMTP_PORT", 587)?,
            smtp_username: optional("SMTP_USERNAME"),
            smtp_password: optional("SMTP_PASSWORD"),
            smtp_from_email: or_default("SMTP_FROM_EMAIL", DEFAULT_SMTP_FROM_EMAIL),

            push_api_url: optional("PUSH_API_URL")
                .map(|value| validated_url("PUSH_API_URL", value))
                .transpose()?,
            push_server_key: optional("PUSH_SERVER_KEY"),

            cors_origins: optional("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            notification_dispatch_cron: or_default(
                "NOTIFICATION_DISPATCH_CRON",
                DEFAULT_DISPATCH_CRON,
            ),
            negotiation_expiry_cron: or_default("NEGOTIATION_EXPIRY_CRON", DEFAULT_EXPIRY_CRON),
        })
    }

    pub fn otp_policy(&self) -> OtpPolicy {
        OtpPolicy {
            expire_minutes: self.otp_expire_minutes,
            max_attempts: self.otp_max_attempts,
        }
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Reads an optional variable, treating an empty value as unset.
fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn or_default(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

fn url_or_default(name: &str, default: &str) -> Result<String, ConfigError> {
    validated_url(name, or_default(name, default))
}

/// Ensures the value parses as an absolute URL, returning it without a trailing slash.
fn validated_url(name: &str, value: String) -> Result<String, ConfigError> {
    match url::Url::parse(&value) {
        Ok(_) => Ok(value.trim_end_matches('/').to_string()),
        Err(_) => Err(ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value,
        }),
    }
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
