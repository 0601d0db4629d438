//! Architecture fan-out
//!
//! Launches one pipeline per architecture as its own task and joins them all.
//! Pipelines share nothing but the read-only services and the date-scoped log
//! root, under which each writes only its own subdirectory. A failing or
//! panicking pipeline never cancels the others.

use archsmoke_core::domain::job::{JobDescriptor, JobOutcome, JobStatus};
use archsmoke_core::domain::log::{LogEntry, LogLevel};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};
use uuid::Uuid;

use crate::context::Context;
use crate::error::PipelineError;
use crate::repository::LogRoot;
use crate::service::Services;

/// Aggregated result of one orchestration run
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// The `<log_base>/<YYYYMMDD>` directory of this run
    pub log_dir: PathBuf,
    /// One outcome per architecture, in launch order
    pub outcomes: Vec<JobOutcome>,
}

impl RunSummary {
    /// True iff every pipeline was skipped or exited zero
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(JobOutcome::is_success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Process exit code for the run
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Runs the pipelines of one orchestration run
pub struct ArchScheduler {
    log_root: LogRoot,
    services: Services,
    semaphore: Option<Arc<Semaphore>>,
}

impl ArchScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    /// * `log_root` - Date-scoped log directory, computed once per run
    /// * `services` - Skip oracle, executor and reporter shared by all pipelines
    /// * `max_parallel` - Concurrency bound, `None` for one task per architecture
    pub fn new(log_root: LogRoot, services: Services, max_parallel: Option<usize>) -> Self {
        Self {
            log_root,
            services,
            semaphore: max_parallel.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Runs every descriptor's pipeline and waits for all of them
    pub async fn run(&self, run_id: Uuid, descriptors: Vec<JobDescriptor>) -> RunSummary {
        info!(
            "Launching {} pipeline(s) for run {} (logs in {})",
            descriptors.len(),
            run_id,
            self.log_root.path().display()
        );

        let handles: Vec<_> = descriptors
            .into_iter()
            .map(|descriptor| {
                let architecture = descriptor.architecture.clone();
                (architecture, self.spawn_pipeline(descriptor))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (architecture, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let message = format!("Pipeline task failed: {}", e);
                    error!("[{}] {}", architecture, message);
                    self.record_task_failure(&architecture, &message).await;
                    JobOutcome::failed(run_id, &architecture, 1, message)
                }
            };
            outcomes.push(outcome);
        }

        let summary = RunSummary {
            run_id,
            log_dir: self.log_root.path().to_path_buf(),
            outcomes,
        };
        info!(
            "Run {} finished: {} pipeline(s), {} failed",
            run_id,
            summary.outcomes.len(),
            summary.failed().count()
        );
        summary
    }

    /// Appends a task failure to the architecture's `output.log`
    async fn record_task_failure(&self, architecture: &str, message: &str) {
        let entry = LogEntry::new(LogLevel::Error, message.to_string());
        let written = match self.log_root.open_job(architecture).await {
            Ok(mut log) => log.record(&entry).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            error!("[{}] Failed to record task failure: {}", architecture, e);
        }
    }

    /// Spawns a task for a single pipeline
    fn spawn_pipeline(&self, descriptor: JobDescriptor) -> tokio::task::JoinHandle<JobOutcome> {
        let log_root = self.log_root.clone();
        let services = self.services.clone();
        let semaphore = self.semaphore.clone();

        tokio::spawn(async move {
            // Permit is released when dropped at the end of the pipeline
            let _permit = match semaphore {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            run_pipeline(descriptor, &log_root, &services).await
        })
    }
}

/// Runs skip check, remote run and report for one architecture
///
/// Always produces an outcome; every error ends up in it and in the
/// architecture's `output.log`.
pub async fn run_pipeline(
    descriptor: JobDescriptor,
    log_root: &LogRoot,
    services: &Services,
) -> JobOutcome {
    let run_id = descriptor.run_id;
    let architecture = descriptor.architecture.clone();

    let log = match log_root.open_job(&architecture).await {
        Ok(log) => log,
        Err(e) => {
            let err = PipelineError::Log(e);
            error!("[{}] {}", architecture, err);
            return JobOutcome::failed(run_id, &architecture, err.exit_code(), err.to_string());
        }
    };

    let mut ctx = Context::new(descriptor, log);
    ctx.log_info(format!("Pipeline started (run {})", run_id))
        .await;

    let outcome = match execute_stages(&mut ctx, services).await {
        Ok(outcome) => outcome,
        Err(e) => {
            ctx.log_error(e.to_string()).await;
            let mut failed =
                JobOutcome::failed(run_id, &architecture, e.exit_code(), e.to_string());
            failed.image = ctx.image.clone();
            failed
        }
    };

    match outcome.status() {
        JobStatus::Skipped => {
            ctx.log_info("Pipeline skipped".to_string()).await;
            // Skipped jobs leave nothing behind but the skip-check output
            return outcome;
        }
        JobStatus::Passed => ctx.log_info("Pipeline passed".to_string()).await,
        JobStatus::Failed => {
            ctx.log_info(format!(
                "Pipeline failed with exit code {}",
                outcome.exit_code
            ))
            .await
        }
    }

    if let Err(e) = ctx.log.write_outcome(&outcome).await {
        ctx.log_warning(format!("Failed to write outcome record: {}", e))
            .await;
    }

    outcome
}

async fn execute_stages(
    ctx: &mut Context,
    services: &Services,
) -> Result<JobOutcome, PipelineError> {
    if services.skip_oracle.already_reported(ctx).await? {
        ctx.log_info("Results already reported, skipping".to_string())
            .await;
        return Ok(JobOutcome::skipped(&ctx.descriptor));
    }

    let mut outcome = services.executor.execute(ctx).await?;

    if let Err(e) = services.reporter.report(ctx, &outcome).await {
        ctx.log_error(e.to_string()).await;
        outcome.fail(e.exit_code(), e.to_string());
    }

    Ok(outcome)
}
