//! Job domain types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::fields::ResultFields;

/// Run parameters for one architecture
///
/// Built once per architecture at orchestration start and moved into the
/// pipeline task that owns it. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Identifier shared by every job of one orchestration run
    pub run_id: Uuid,
    pub architecture: String,
    /// Release stream whose image is resolved before the run (e.g. "rawhide")
    pub distro_image: String,
    pub git_url: String,
    pub plan: String,
    /// Working directory of the remote-run subprocess
    pub workdir: PathBuf,
}

/// Result of one architecture's pipeline
///
/// Produced exactly once per architecture per run. Everything in `fields` is
/// parsed from the remote run's output and stays empty for skipped jobs and
/// jobs that failed before extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub run_id: Uuid,
    pub architecture: String,
    pub skipped: bool,
    pub exit_code: i32,
    /// Resolved image identifier, once lookup succeeded
    pub image: Option<String>,
    #[serde(flatten)]
    pub fields: ResultFields,
    pub error_message: Option<String>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl JobOutcome {
    /// A job whose result was already reported
    pub fn skipped(descriptor: &JobDescriptor) -> Self {
        Self {
            skipped: true,
            ..Self::blank(descriptor.run_id, &descriptor.architecture)
        }
    }

    /// A remote run that exited successfully and produced `fields`
    pub fn completed(descriptor: &JobDescriptor, image: String, fields: ResultFields) -> Self {
        Self {
            image: Some(image),
            fields,
            ..Self::blank(descriptor.run_id, &descriptor.architecture)
        }
    }

    /// A pipeline that failed with `exit_code`
    pub fn failed(
        run_id: Uuid,
        architecture: &str,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            exit_code,
            error_message: Some(message.into()),
            ..Self::blank(run_id, architecture)
        }
    }

    /// Marks a previously successful outcome as failed, keeping parsed fields
    pub fn fail(&mut self, exit_code: i32, message: impl Into<String>) {
        self.exit_code = exit_code;
        self.error_message = Some(message.into());
        self.completed_at = chrono::Utc::now();
    }

    /// Skipped and zero-exit outcomes count as success
    pub fn is_success(&self) -> bool {
        self.skipped || self.exit_code == 0
    }

    pub fn status(&self) -> JobStatus {
        if self.skipped {
            JobStatus::Skipped
        } else if self.exit_code == 0 {
            JobStatus::Passed
        } else {
            JobStatus::Failed
        }
    }

    fn blank(run_id: Uuid, architecture: &str) -> Self {
        Self {
            run_id,
            architecture: architecture.to_string(),
            skipped: false,
            exit_code: 0,
            image: None,
            fields: ResultFields::default(),
            error_message: None,
            completed_at: chrono::Utc::now(),
        }
    }
}

/// Terminal status of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Skipped,
    Passed,
    Failed,
}
