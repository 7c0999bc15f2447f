//! Background jobs driven by `tokio-cron-scheduler`.
//!
//! - `notification_dispatch` - delivers queued SMS, push, and email notifications
//! - `negotiation_expiry` - expires offers and negotiations past their deadline
//!
//! Both schedules come from configuration and use six-field cron expressions
//! (seconds first).

pub mod negotiation_expiry;
pub mod notification_dispatch;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{
    config::Config, data::notification::NotificationRepository, error::AppError,
    service::notification::channel::Gateways,
};

/// Starts the job scheduler with the dispatch and expiry jobs.
///
/// The scheduler runs on its own tasks once started; the returned future completes as
/// soon as both jobs are registered. Job failures are logged and never stop the
/// scheduler. Notifications left claimed by a previous run go back to the queue first,
/// and a dispatch tick is skipped while the previous one is still delivering.
///
/// # Arguments
/// - `db` - Database connection
/// - `gateways` - Delivery gateways used by the dispatcher
/// - `config` - Source of the two cron expressions
///
/// # Returns
/// - `Ok(())` - Scheduler started
/// - `Err(AppError::SchedulerErr)` - Invalid cron expression or scheduler failure
pub async fn start_scheduler(
    db: DatabaseConnection,
    gateways: Gateways,
    config: &Config,
) -> Result<(), AppError> {
    let released = NotificationRepository::new(&db).release_claims().await?;
    if released > 0 {
        tracing::warn!("Returned {} interrupted notifications to the queue", released);
    }

    let scheduler = JobScheduler::new().await?;

    let job_db = db.clone();
    let job_gateways = gateways.clone();
    let dispatching = Arc::new(Mutex::new(()));
    let dispatch_job = Job::new_async(
        config.notification_dispatch_cron.as_str(),
        move |_uuid, _lock| {
            let db = job_db.clone();
            let gateways = job_gateways.clone();
            let dispatching = dispatching.clone();

            Box::pin(async move {
                let Ok(_running) = dispatching.try_lock() else {
                    tracing::debug!("Previous dispatch still running, skipping tick");
                    return;
                };
                if let Err(e) = notification_dispatch::run(&db, &gateways).await {
                    tracing::error!("Error dispatching notifications: {}", e);
                }
            })
        },
    )?;

    let job_db = db.clone();
    let expiry_job = Job::new_async(
        config.negotiation_expiry_cron.as_str(),
        move |_uuid, _lock| {
            let db = job_db.clone();

            Box::pin(async move {
                if let Err(e) = negotiation_expiry::run(&db).await {
                    tracing::error!("Error expiring negotiations: {}", e);
                }
            })
        },
    )?;

    scheduler.add(dispatch_job).await?;
    scheduler.add(expiry_job).await?;
    scheduler.start().await?;

    tracing::info!(
        "Scheduler started (dispatch: '{}', expiry: '{}')",
        config.notification_dispatch_cron,
        config.negotiation_expiry_cron
    );

    Ok(())
}
