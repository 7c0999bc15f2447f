use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::server::{
    error::AppError,
    service::notification::{channel::Gateways, dispatcher::NotificationDispatcher},
};

/// Runs one dispatcher tick and logs the outcome when anything happened.
pub async fn run(db: &DatabaseConnection, gateways: &Gateways) -> Result<(), AppError> {
    let report = NotificationDispatcher::new(db, gateways)
        .dispatch_pending(Utc::now())
        .await?;

    if report.sent > 0 || report.failed > 0 {
        tracing::info!(
            "Dispatched notifications: {} sent, {} failed, {} deferred",
            report.sent,
            report.failed,
            report.deferred
        );
    }

    Ok(())
}
