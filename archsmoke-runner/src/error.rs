//! Pipeline error taxonomy
//!
//! Every variant is fatal to the pipeline of one architecture only. None of
//! them is retried.

use archsmoke_client::ClientError;
use archsmoke_core::domain::fields::ResultField;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The prior-report query could not run or exited nonzero
    #[error("Skip query failed: {0}")]
    SkipQuery(#[source] ClientError),

    /// No image could be resolved for the architecture
    #[error("Image lookup failed: {0}")]
    Lookup(#[source] ClientError),

    /// The remote-run command could not be started or its output not captured
    #[error("Remote run failed: {0}")]
    RemoteRun(#[source] ClientError),

    /// The remote run exited with a code outside the accepted set
    #[error("Remote run exited with code {code}")]
    Execution { code: i32 },

    /// The remote run succeeded but did not print a required field
    #[error("Remote run output is missing required field(s): {}", join_fields(.fields))]
    MissingFields { fields: Vec<ResultField> },

    /// The report command could not be started or its output not captured
    #[error("Report submission failed: {0}")]
    Submit(#[source] ClientError),

    /// The report submission exited nonzero
    #[error("Report submission exited with code {code}")]
    Submission { code: i32 },

    /// The architecture's log directory or files could not be written
    #[error("Log sink error: {0}")]
    Log(#[from] std::io::Error),
}

impl PipelineError {
    /// Exit code recorded in the job outcome
    ///
    /// Collaborator exit codes are propagated; everything else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Execution { code } | PipelineError::Submission { code } if *code != 0 => {
                *code
            }
            _ => 1,
        }
    }
}

fn join_fields(fields: &[ResultField]) -> String {
    fields
        .iter()
        .map(|field| field.key())
        .collect::<Vec<_>>()
        .join(", ")
}
