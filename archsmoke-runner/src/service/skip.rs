//! Skip oracle
//!
//! Decides whether an architecture's result was already reported by an
//! earlier automated run. Skipping only happens on a successful query whose
//! output carries the sentinel; a query that cannot run fails the pipeline.

use archsmoke_client::ReportClient;
use async_trait::async_trait;

use crate::context::Context;
use crate::error::PipelineError;

/// Service trait for prior-report detection
#[async_trait]
pub trait SkipOracle: Send + Sync {
    /// Returns true if the architecture was already reported
    ///
    /// The query output is recorded in the architecture's `output.log`.
    async fn already_reported(&self, ctx: &mut Context) -> Result<bool, PipelineError>;
}

/// Skip oracle backed by the reporting command's list query
pub struct ReportQueryOracle {
    client: ReportClient,
    sentinel: String,
}

impl ReportQueryOracle {
    pub fn new(client: ReportClient, sentinel: String) -> Self {
        Self { client, sentinel }
    }
}

#[async_trait]
impl SkipOracle for ReportQueryOracle {
    async fn already_reported(&self, ctx: &mut Context) -> Result<bool, PipelineError> {
        ctx.log_info("Checking for an existing report".to_string()).await;

        self.client
            .has_prior_report(&ctx.descriptor.architecture, &self.sentinel, &mut ctx.log)
            .await
            .map_err(PipelineError::SkipQuery)
    }
}
