//! Execution service
//!
//! Handles one architecture's remote test run:
//! - Resolving the image for the configured release stream
//! - Running the remote test and capturing its output into `tft-wait.log`
//! - Judging the exit code and extracting the result fields
//!
//! A rejected exit code ends the job before any field is looked at.

use archsmoke_client::{ImageLookupClient, RemoteRunClient, RemoteRunRequest};
use archsmoke_core::domain::fields::{ResultField, ResultFields};
use archsmoke_core::domain::job::JobOutcome;
use async_trait::async_trait;

use crate::config::Config;
use crate::context::Context;
use crate::error::PipelineError;
use crate::repository::LogStream;

/// Service trait for executing one architecture's remote run
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Runs the job described by `ctx.descriptor`
    ///
    /// # Returns
    /// A successful outcome carrying the parsed fields, or the error that
    /// ended the job
    async fn execute(&self, ctx: &mut Context) -> Result<JobOutcome, PipelineError>;
}

/// Standard implementation of ExecutionService
pub struct StandardExecutionService {
    lookup: ImageLookupClient,
    remote_run: RemoteRunClient,
    required_fields: Vec<ResultField>,
    accepted_exit_codes: Vec<i32>,
}

impl StandardExecutionService {
    /// Creates a new standard execution service
    pub fn new(
        lookup: ImageLookupClient,
        remote_run: RemoteRunClient,
        required_fields: Vec<ResultField>,
        accepted_exit_codes: Vec<i32>,
    ) -> Self {
        Self {
            lookup,
            remote_run,
            required_fields,
            accepted_exit_codes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ImageLookupClient::new(config.image_lookup_cmd.clone()),
            RemoteRunClient::new(config.remote_run_cmd.clone(), config.debug),
            config.backend.required_fields().to_vec(),
            config.accepted_exit_codes.clone(),
        )
    }

    fn is_accepted(&self, code: i32) -> bool {
        code == 0 || self.accepted_exit_codes.contains(&code)
    }
}

#[async_trait]
impl ExecutionService for StandardExecutionService {
    async fn execute(&self, ctx: &mut Context) -> Result<JobOutcome, PipelineError> {
        let stream = ctx.descriptor.distro_image.clone();
        ctx.log_info(format!("Resolving {} image", stream)).await;

        let image = self
            .lookup
            .resolve(&stream, &ctx.descriptor.architecture, &mut ctx.log)
            .await
            .map_err(PipelineError::Lookup)?;
        ctx.log_info(format!("Resolved image {}", image)).await;
        ctx.image = Some(image.clone());

        let request = RemoteRunRequest {
            git_url: ctx.descriptor.git_url.clone(),
            compose: image.clone(),
            plan: ctx.descriptor.plan.clone(),
            architecture: ctx.descriptor.architecture.clone(),
        };
        ctx.log_info(format!(
            "Starting remote run (git {}, plan {})",
            request.git_url, request.plan
        ))
        .await;

        let result = {
            let mut remote_log = ctx.log.stream(LogStream::RemoteRun).await?;
            self.remote_run
                .run(&request, &ctx.descriptor.workdir, &mut remote_log)
                .await
                .map_err(PipelineError::RemoteRun)?
        };

        if !self.is_accepted(result.exit_code) {
            return Err(PipelineError::Execution {
                code: result.exit_code,
            });
        }
        if result.exit_code != 0 {
            ctx.log_warning(format!(
                "Remote run exited with accepted code {}",
                result.exit_code
            ))
            .await;
        }

        let fields = ResultFields::parse(&result.output);
        let missing = fields.missing(&self.required_fields);
        if !missing.is_empty() {
            return Err(PipelineError::MissingFields { fields: missing });
        }

        ctx.log_info(format!(
            "Remote run finished: state={}, duration={}, results={}",
            fields.final_state.as_deref().unwrap_or("-"),
            fields.duration.as_deref().unwrap_or("-"),
            fields.results.as_deref().unwrap_or("-"),
        ))
        .await;

        Ok(JobOutcome::completed(&ctx.descriptor, image, fields))
    }
}
