use std::{sync::Arc, time::Duration};

use crate::server::{
    config::Config,
    error::AppError,
    service::notification::{
        channel::Gateways, email::EmailGateway, push::PushGateway, sms::SmsGateway,
    },
};

/// Connects to the database and runs pending migrations.
///
/// Establishes a connection pool to the database (Postgres or SQLite) using the connection string from
/// configuration, then automatically runs all pending SeaORM migrations to ensure the database
/// schema is up-to-date. This function must complete successfully before the application can
/// access the database.
///
/// # Arguments
/// - `config` - Application configuration containing the database URL
///
/// # Returns
/// - `Ok(DatabaseConnection)` - Connected database with migrations applied
/// - `Err(Error)` - Failed to connect to database or run migrations
pub async fn connect_to_database(config: &Config) -> Result<sea_orm::DatabaseConnection, AppError> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Builds the HTTP client shared by the SMS and push gateways.
///
/// Redirects are disabled so a misconfigured provider URL cannot bounce requests
/// (and the bearer credentials attached to them) to another host.
///
/// # Returns
/// - `Ok(reqwest::Client)` - Client with timeouts and redirects disabled
/// - `Err(AppError::ReqwestErr)` - TLS backend failed to initialize
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .build()?;

    Ok(client)
}

/// Builds the SMS, push, and email gateways from configuration.
///
/// Gateways without credentials still construct; they log outgoing messages instead
/// of delivering them so local development works without provider accounts.
///
/// # Arguments
/// - `config` - Application configuration with provider settings
/// - `client` - Shared HTTP client from `setup_reqwest_client`
///
/// # Returns
/// - `Ok(Gateways)` - All three gateways
/// - `Err(AppError::ConfigErr)` - SMTP relay could not be configured
pub fn setup_gateways(config: &Config, client: reqwest::Client) -> Result<Gateways, AppError> {
    let sms = SmsGateway::new(
        client.clone(),
        config.sms_api_url.clone(),
        config.sms_api_token.clone(),
        config.sms_from.clone(),
    );
    let push = PushGateway::new(
        client,
        config.push_api_url.clone(),
        config.push_server_key.clone(),
    );
    let email = EmailGateway::from_config(config)?;

    Ok(Gateways {
        sms: Arc::new(sms),
        push: Arc::new(push),
        email: Arc::new(email),
    })
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, shutting down gracefully");
}
