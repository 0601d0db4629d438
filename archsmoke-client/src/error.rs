//! Error types for the collaborator clients

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when driving an external collaborator
#[derive(Debug, Error)]
pub enum ClientError {
    /// The subprocess could not be started (not found, permission denied)
    #[error("Failed to execute '{program}': {source}")]
    SpawnFailed {
        /// Program that was being executed
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The subprocess ran but exited unsuccessfully
    #[error("'{program}' exited with code {code}")]
    NonZeroExit {
        /// Program that was executed
        program: String,
        /// Exit code, -1 when terminated by a signal
        code: i32,
    },

    /// The image lookup produced no line for the stream and architecture
    #[error("No image found for stream '{stream}' and architecture '{architecture}'")]
    ImageNotFound {
        stream: String,
        architecture: String,
    },

    /// Reading subprocess output or writing it to the sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid command specification
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl ClientError {
    /// Create a spawn error for `program`
    pub fn spawn_failed(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            source,
        }
    }

    /// Create a non-zero exit error for `program`
    pub fn non_zero_exit(program: impl Into<String>, code: i32) -> Self {
        Self::NonZeroExit {
            program: program.into(),
            code,
        }
    }

    /// Check if the subprocess never started
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::SpawnFailed { .. })
    }

    /// Exit code to record for a job that failed with this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NonZeroExit { code, .. } => *code,
            _ => 1,
        }
    }
}
