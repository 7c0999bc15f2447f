use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::server::{error::AppError, service::negotiation::NegotiationService};

/// Expires every negotiation whose head offer or overall deadline has passed.
pub async fn run(db: &DatabaseConnection) -> Result<(), AppError> {
    let expired = NegotiationService::new(db).expire_stale(Utc::now()).await?;

    if expired > 0 {
        tracing::info!("Expired {} stale negotiations", expired);
    }

    Ok(())
}
