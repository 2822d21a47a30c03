//! Background job scheduler.
//!
//! Registers the periodic catalog sync when `KATALOG_IMPORT_CRON` is set.

use katalog_core::{AppConfig, ImportMode};
use katalog_fastprint::FastprintClient;
use katalog_import::{run_remote_import_tracked, TriggerSource};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::cache::StatusCache;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is rejected, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    client: FastprintClient,
    status_cache: StatusCache,
    config: &AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match config.import_cron.as_deref() {
        Some(schedule) => {
            register_sync_job(&scheduler, schedule, pool, client, status_cache).await?;
        }
        None => tracing::info!("scheduler: periodic catalog sync disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the catalog sync job on `schedule` (six-field cron, UTC).
async fn register_sync_job(
    scheduler: &JobScheduler,
    schedule: &str,
    pool: PgPool,
    client: FastprintClient,
    status_cache: StatusCache,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let pool = pool.clone();
        let client = client.clone();
        let status_cache = status_cache.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting catalog sync");
            run_sync_job(&pool, &client, &status_cache).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule, "scheduler: catalog sync registered");
    Ok(())
}

async fn run_sync_job(pool: &PgPool, client: &FastprintClient, status_cache: &StatusCache) {
    let outcome =
        run_remote_import_tracked(pool, client, TriggerSource::Scheduler, ImportMode::Commit)
            .await;

    if outcome.succeeded {
        status_cache.invalidate().await;
        tracing::info!(
            created = outcome.stats.total_created(),
            skipped = outcome.stats.total_skipped(),
            "scheduler: catalog sync complete"
        );
    } else {
        tracing::error!(message = %outcome.message, "scheduler: catalog sync failed");
    }
}
