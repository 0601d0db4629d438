//! Report service
//!
//! Submits a completed job's result for the architecture's section. The
//! submission's exit code becomes the job's exit code.

use archsmoke_client::{ReportClient, Submission};
use archsmoke_core::domain::job::JobOutcome;
use archsmoke_core::domain::report::ReportBackend;
use async_trait::async_trait;

use crate::context::Context;
use crate::error::PipelineError;
use crate::repository::LogStream;

/// Service trait for result submission
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Submits `outcome`, writing the command's output to `report-results.log`
    async fn report(&self, ctx: &mut Context, outcome: &JobOutcome) -> Result<(), PipelineError>;
}

/// Standard implementation of ReportService
pub struct StandardReportService {
    client: ReportClient,
    backend: ReportBackend,
}

impl StandardReportService {
    pub fn new(client: ReportClient, backend: ReportBackend) -> Self {
        Self { client, backend }
    }

    /// Builds the submission for `outcome` according to the backend
    pub fn submission(&self, outcome: &JobOutcome) -> Result<Submission, PipelineError> {
        let missing = outcome.fields.missing(self.backend.required_fields());
        if !missing.is_empty() {
            return Err(PipelineError::MissingFields { fields: missing });
        }

        let fields = &outcome.fields;
        let submission = match self.backend {
            ReportBackend::Comment => Submission {
                section: outcome.architecture.clone(),
                comment: fields.artifacts_url.clone(),
                status: fields.results.clone(),
                ..Default::default()
            },
            ReportBackend::ApiUrl => Submission {
                section: outcome.architecture.clone(),
                api_url: fields.api_url.clone(),
                status: fields.results.clone(),
                ..Default::default()
            },
        };
        Ok(submission)
    }
}

#[async_trait]
impl ReportService for StandardReportService {
    async fn report(&self, ctx: &mut Context, outcome: &JobOutcome) -> Result<(), PipelineError> {
        let submission = self.submission(outcome)?;
        ctx.log_info(format!(
            "Submitting results via {} backend (status {})",
            self.backend,
            submission.status.as_deref().unwrap_or("-")
        ))
        .await;

        let result = {
            let mut report_log = ctx.log.stream(LogStream::Report).await?;
            self.client
                .submit(&submission, &mut report_log)
                .await
                .map_err(PipelineError::Submit)?
        };

        if !result.success() {
            return Err(PipelineError::Submission {
                code: result.exit_code,
            });
        }

        ctx.log_info("Results submitted".to_string()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archsmoke_client::CommandSpec;
    use archsmoke_core::domain::fields::{ResultField, ResultFields};
    use archsmoke_core::domain::job::JobDescriptor;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn outcome(output: &str) -> JobOutcome {
        let descriptor = JobDescriptor {
            run_id: Uuid::new_v4(),
            architecture: "aarch64".to_string(),
            distro_image: "rawhide".to_string(),
            git_url: "https://example.org/smoke.git".to_string(),
            plan: "/plans/smoke".to_string(),
            workdir: PathBuf::from("."),
        };
        JobOutcome::completed(&descriptor, "img".to_string(), ResultFields::parse(output))
    }

    fn service(backend: ReportBackend) -> StandardReportService {
        StandardReportService::new(
            ReportClient::new(CommandSpec::new("report"), false, false),
            backend,
        )
    }

    #[test]
    fn test_comment_submission() {
        let submission = service(ReportBackend::Comment)
            .submission(&outcome("RESULTS=pass\nARTIFACTS_URL=https://example/1\n"))
            .unwrap();
        assert_eq!(submission.section, "aarch64");
        assert_eq!(submission.comment.as_deref(), Some("https://example/1"));
        assert_eq!(submission.status.as_deref(), Some("pass"));
        assert_eq!(submission.api_url, None);
    }

    #[test]
    fn test_api_url_submission_without_results() {
        let submission = service(ReportBackend::ApiUrl)
            .submission(&outcome("API_URL=https://api/1\n"))
            .unwrap();
        assert_eq!(submission.api_url.as_deref(), Some("https://api/1"));
        assert_eq!(submission.status, None);
        assert_eq!(submission.comment, None);
    }

    #[test]
    fn test_submission_requires_fields() {
        let err = service(ReportBackend::Comment)
            .submission(&outcome("RESULTS=pass\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingFields { ref fields } if fields == &vec![ResultField::ArtifactsUrl]
        ));
    }
}
