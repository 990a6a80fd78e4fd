//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring geo reindex job when one is configured.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use geofind_discovery::{DiscoveryService, ReindexEvent};

/// Builds and starts the background job scheduler.
///
/// Returns `None` when no reindex schedule is configured; otherwise the
/// running [`JobScheduler`] handle, which must be kept alive for the
/// lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    service: DiscoveryService,
    config: &geofind_core::AppConfig,
) -> Result<Option<JobScheduler>, JobSchedulerError> {
    let Some(schedule) = config.reindex_schedule.clone() else {
        tracing::info!("no reindex schedule configured; scheduled reindex disabled");
        return Ok(None);
    };

    let scheduler = JobScheduler::new().await?;
    register_reindex_job(&scheduler, &schedule, service).await?;
    scheduler.start().await?;
    Ok(Some(scheduler))
}

/// Register the recurring geo reindex job.
///
/// Each run rebuilds the whole index from the catalog; per-record failures
/// are logged and skipped, and the index keeps serving the previous
/// contents if the catalog is unreachable.
async fn register_reindex_job(
    scheduler: &JobScheduler,
    schedule: &str,
    service: DiscoveryService,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let service = service.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting geo reindex run");
            run_reindex_job(service).await;
            tracing::info!("scheduler: geo reindex run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Drive one reindex run to completion, logging instead of streaming.
async fn run_reindex_job(service: DiscoveryService) {
    let mut events = service.reindex();
    let mut failed = 0u32;

    while let Some(event) = events.recv().await {
        match event {
            ReindexEvent::Added { .. } => {}
            ReindexEvent::Failed { message } => {
                failed += 1;
                tracing::warn!(%message, "scheduler: record skipped during reindex");
            }
            ReindexEvent::Completed { total } => {
                tracing::info!(total, failed, "scheduler: geo index rebuilt");
            }
        }
    }
}
