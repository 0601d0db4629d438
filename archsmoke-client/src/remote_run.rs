//! Remote test-run client
//!
//! Wraps the command that submits a test request to the remote test farm and
//! blocks until it reaches a terminal state. The command bounds its own
//! duration; no timeout is applied here.

use std::path::Path;
use tracing::info;

use crate::CommandSpec;
use crate::error::Result;
use crate::process::{OutputSink, ProcessOutput, run_captured};

/// Parameters for one remote run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRunRequest {
    pub git_url: String,
    /// Resolved compose/image identifier
    pub compose: String,
    pub plan: String,
    pub architecture: String,
}

/// Client for the remote test-run command
#[derive(Debug, Clone)]
pub struct RemoteRunClient {
    command: CommandSpec,
    debug: bool,
}

impl RemoteRunClient {
    pub fn new(command: CommandSpec, debug: bool) -> Self {
        Self { command, debug }
    }

    /// Builds the named-parameter argument list for a request
    pub fn args(&self, request: &RemoteRunRequest) -> Vec<String> {
        let mut args = vec![
            "--git-url".to_string(),
            request.git_url.clone(),
            "--compose".to_string(),
            request.compose.clone(),
            "--plan".to_string(),
            request.plan.clone(),
            "--arch".to_string(),
            request.architecture.clone(),
        ];
        if self.debug {
            args.push("--debug".to_string());
        }
        args
    }

    /// Runs the remote test and waits for it to finish
    ///
    /// The exit code is returned as-is; judging it is up to the caller.
    pub async fn run(
        &self,
        request: &RemoteRunRequest,
        workdir: &Path,
        sink: &mut dyn OutputSink,
    ) -> Result<ProcessOutput> {
        info!(
            "Starting remote run for {} on {} (plan {})",
            request.architecture, request.compose, request.plan
        );

        let result = run_captured(&self.command, &self.args(request), Some(workdir), sink).await?;

        info!(
            "Remote run for {} finished with exit code {}",
            request.architecture, result.exit_code
        );
        Ok(result)
    }
}
