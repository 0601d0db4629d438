//! Execution context for one architecture's pipeline
//!
//! Contains all state a pipeline owns exclusively:
//! - The immutable job descriptor
//! - The log record under `<log_root>/<date>/<architecture>/`
//! - The resolved image, once lookup succeeded
//!
//! Status lines go both to the architecture's `output.log` and to `tracing`.

use archsmoke_core::domain::job::JobDescriptor;
use archsmoke_core::domain::log::{LogEntry, LogLevel};
use tracing::{error, info, warn};

use crate::repository::JobLog;

/// Execution context owned by a single pipeline task
pub struct Context {
    pub descriptor: JobDescriptor,
    pub log: JobLog,
    /// Set by the executor so failed outcomes still name the image
    pub image: Option<String>,
}

impl Context {
    /// Creates a new execution context
    ///
    /// # Arguments
    /// * `descriptor` - The architecture's run parameters
    /// * `log` - The architecture's opened log record
    pub fn new(descriptor: JobDescriptor, log: JobLog) -> Self {
        Self {
            descriptor,
            log,
            image: None,
        }
    }

    pub fn architecture(&self) -> &str {
        &self.descriptor.architecture
    }

    /// Logs an info message
    pub async fn log_info(&mut self, message: String) {
        info!("[{}] {}", self.descriptor.architecture, message);
        self.add_log(LogEntry::new(LogLevel::Info, message)).await;
    }

    /// Logs a warning message
    pub async fn log_warning(&mut self, message: String) {
        warn!("[{}] {}", self.descriptor.architecture, message);
        self.add_log(LogEntry::new(LogLevel::Warning, message)).await;
    }

    /// Logs an error message
    pub async fn log_error(&mut self, message: String) {
        error!("[{}] {}", self.descriptor.architecture, message);
        self.add_log(LogEntry::new(LogLevel::Error, message)).await;
    }

    /// Appends an entry to `output.log`
    ///
    /// A failing log file is reported through `tracing` only; the pipeline
    /// keeps going so its outcome is still produced.
    async fn add_log(&mut self, entry: LogEntry) {
        if let Err(e) = self.log.record(&entry).await {
            error!(
                "[{}] Failed to write to {}: {}",
                self.descriptor.architecture,
                self.log.dir().display(),
                e
            );
        }
    }
}
