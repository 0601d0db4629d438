//! Logs repository
//!
//! Persists everything a pipeline produces under
//! `<log_base>/<YYYYMMDD>/<architecture>/`:
//!
//! - `output.log`: every line for the architecture, including status lines
//! - `tft-wait.log`: remote-run output
//! - `report-results.log`: report submission output
//! - `outcome.json`: the final job outcome
//!
//! Files are opened in append mode, so a second run on the same date reuses
//! the directory and never truncates earlier logs. Architectures write to
//! disjoint subdirectories and need no locking.

use archsmoke_client::OutputSink;
use archsmoke_core::domain::job::JobOutcome;
use archsmoke_core::domain::log::LogEntry;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

const OUTPUT_LOG: &str = "output.log";
const OUTCOME_FILE: &str = "outcome.json";

/// Collaborator output streams with their own log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    RemoteRun,
    Report,
}

impl LogStream {
    pub fn file_name(self) -> &'static str {
        match self {
            LogStream::RemoteRun => "tft-wait.log",
            LogStream::Report => "report-results.log",
        }
    }
}

/// Date-scoped log directory of one orchestration run
///
/// Computed once at startup and handed to every pipeline.
#[derive(Debug, Clone)]
pub struct LogRoot {
    dir: PathBuf,
}

impl LogRoot {
    pub fn new(base: &Path, date: NaiveDate) -> Self {
        Self {
            dir: base.join(date.format("%Y%m%d").to_string()),
        }
    }

    /// Log root for the current local date
    pub fn for_today(base: &Path) -> Self {
        Self::new(base, chrono::Local::now().date_naive())
    }

    /// The `<log_base>/<YYYYMMDD>` directory
    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn job_dir(&self, architecture: &str) -> PathBuf {
        self.dir.join(architecture)
    }

    /// Creates (or reuses) the architecture's directory and opens `output.log`
    pub async fn open_job(&self, architecture: &str) -> std::io::Result<JobLog> {
        let dir = self.job_dir(architecture);
        tokio::fs::create_dir_all(&dir).await?;
        let output = open_append(&dir.join(OUTPUT_LOG)).await?;
        Ok(JobLog { dir, output })
    }
}

/// Log record of one architecture for one date
///
/// Raw bytes written through [`OutputSink`] land in `output.log` verbatim.
pub struct JobLog {
    dir: PathBuf,
    output: File,
}

impl JobLog {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends a status line to `output.log`
    pub async fn record(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = format!("{}\n", entry);
        self.output.write_all(line.as_bytes()).await?;
        self.output.flush().await
    }

    /// Opens a stream log; lines written to it are duplicated into `output.log`
    pub async fn stream(&mut self, stream: LogStream) -> std::io::Result<StreamLog<'_>> {
        let file = open_append(&self.dir.join(stream.file_name())).await?;
        Ok(StreamLog { file, job: self })
    }

    /// Writes the outcome as pretty-printed JSON, replacing an earlier one
    pub async fn write_outcome(&self, outcome: &JobOutcome) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(outcome).map_err(std::io::Error::other)?;
        tokio::fs::write(self.dir.join(OUTCOME_FILE), json).await
    }
}

#[async_trait]
impl OutputSink for JobLog {
    async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.output.write_all(line).await?;
        self.output.flush().await
    }
}

/// A collaborator's own log file, teed into `output.log`
pub struct StreamLog<'a> {
    file: File,
    job: &'a mut JobLog,
}

#[async_trait]
impl<'a> OutputSink for StreamLog<'a> {
    async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.file.write_all(line).await?;
        self.file.flush().await?;
        self.job.write_line(line).await
    }
}

async fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path).await
}
