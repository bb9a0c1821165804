//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the daily
//! pipeline run on the cron expression from config.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use trendscope_pipeline::{PipelineDeps, PipelineError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    deps: Arc<PipelineDeps>,
    config: Arc<trendscope_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(config.pipeline_cron.as_str(), move |_uuid, _lock| {
        let deps = Arc::clone(&deps);

        Box::pin(async move {
            let date = Utc::now().date_naive();
            tracing::info!(%date, "scheduler: starting daily pipeline run");

            match trendscope_pipeline::run(&deps, date, "scheduler", None).await {
                Ok(summary) => {
                    tracing::info!(
                        run_id = summary.run_id,
                        items = summary.items_collected,
                        "scheduler: daily pipeline run complete"
                    );
                }
                Err(PipelineError::RunInProgress { date }) => {
                    tracing::warn!(%date, "scheduler: a run is already active, skipping");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: daily pipeline run failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
