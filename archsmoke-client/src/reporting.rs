//! Reporting client
//!
//! The reporting command has two modes: a read-only query that lists the
//! test cases recorded for a section, and a submission that records a new
//! result for it.

use archsmoke_core::domain::report::contains_sentinel;
use tracing::{debug, info};

use crate::CommandSpec;
use crate::error::{ClientError, Result};
use crate::process::{OutputSink, ProcessOutput, run_captured};

/// One result submission for an architecture's section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub section: String,
    pub comment: Option<String>,
    pub api_url: Option<String>,
    pub status: Option<String>,
}

/// Client for the reporting command
#[derive(Debug, Clone)]
pub struct ReportClient {
    command: CommandSpec,
    production: bool,
    debug: bool,
}

impl ReportClient {
    pub fn new(command: CommandSpec, production: bool, debug: bool) -> Self {
        Self {
            command,
            production,
            debug,
        }
    }

    /// Arguments for the list query of `section`
    pub fn query_args(&self, section: &str) -> Vec<String> {
        let mut args = vec![
            "--section".to_string(),
            section.to_string(),
            "--list_testcases".to_string(),
        ];
        self.push_global_flags(&mut args);
        args
    }

    /// Arguments for a submission
    pub fn submit_args(&self, submission: &Submission) -> Vec<String> {
        let mut args = vec!["--sections".to_string(), submission.section.clone()];
        if let Some(comment) = &submission.comment {
            args.push("--comment".to_string());
            args.push(comment.clone());
        }
        if let Some(api_url) = &submission.api_url {
            args.push("--api-url".to_string());
            args.push(api_url.clone());
        }
        if let Some(status) = &submission.status {
            args.push("--status".to_string());
            args.push(status.clone());
        }
        self.push_global_flags(&mut args);
        args
    }

    /// Checks whether an automated report already exists for `section`
    ///
    /// Returns true only when the query succeeds and its output contains
    /// `sentinel`. A query that cannot run or exits nonzero is an error.
    pub async fn has_prior_report(
        &self,
        section: &str,
        sentinel: &str,
        sink: &mut dyn OutputSink,
    ) -> Result<bool> {
        debug!("Querying prior reports for section {}", section);

        let result = run_captured(&self.command, &self.query_args(section), None, sink).await?;
        if !result.success() {
            return Err(ClientError::non_zero_exit(
                self.command.program.clone(),
                result.exit_code,
            ));
        }

        let found = contains_sentinel(&result.output, sentinel);
        debug!("Prior report for section {}: {}", section, found);
        Ok(found)
    }

    /// Submits a result; the exit code is returned for the caller to judge
    pub async fn submit(
        &self,
        submission: &Submission,
        sink: &mut dyn OutputSink,
    ) -> Result<ProcessOutput> {
        info!("Submitting results for section {}", submission.section);
        run_captured(&self.command, &self.submit_args(submission), None, sink).await
    }

    fn push_global_flags(&self, args: &mut Vec<String>) {
        if self.production {
            args.push("--production".to_string());
        }
        if self.debug {
            args.push("--debug".to_string());
        }
    }
}
