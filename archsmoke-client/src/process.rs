//! Subprocess execution with combined output capture
//!
//! Stdout and stderr are read concurrently and forwarded line by line, in the
//! order lines arrive, to an [`OutputSink`]. Bytes are passed through
//! verbatim; the returned text is a lossy UTF-8 copy for parsing.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::CommandSpec;
use crate::error::{ClientError, Result};

/// Destination for raw subprocess output
#[async_trait]
pub trait OutputSink: Send {
    /// Receives one line of output, including its trailing newline if any
    async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()>;
}

#[async_trait]
impl OutputSink for Vec<u8> {
    async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.extend_from_slice(line);
        Ok(())
    }
}

/// Exit status and captured output of a finished subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, -1 when the process was terminated by a signal
    pub exit_code: i32,
    /// Combined stdout and stderr in arrival order
    pub output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs `command` followed by `args` and waits for it to exit
///
/// Fails only if the process cannot be spawned or its output cannot be
/// forwarded; a nonzero exit code is returned in [`ProcessOutput`] for the
/// caller to judge.
pub async fn run_captured(
    command: &CommandSpec,
    args: &[String],
    workdir: Option<&Path>,
    sink: &mut dyn OutputSink,
) -> Result<ProcessOutput> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }

    debug!("Executing: {} {:?}", command, args);

    let mut child = cmd
        .spawn()
        .map_err(|e| ClientError::spawn_failed(command.program.clone(), e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ClientError::InvalidCommand("stdout was not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ClientError::InvalidCommand("stderr was not captured".to_string()))?;

    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let mut out_line = Vec::new();
    let mut err_line = Vec::new();
    let mut out_open = true;
    let mut err_open = true;
    let mut captured = Vec::new();

    // A cancelled read_until leaves what it already read in the line buffer,
    // so a partial line can still be pending when the stream reports EOF.
    while out_open || err_open {
        tokio::select! {
            read = stdout.read_until(b'\n', &mut out_line), if out_open => {
                let read = read?;
                forward(sink, &mut captured, &mut out_line).await?;
                out_open = read != 0;
            }
            read = stderr.read_until(b'\n', &mut err_line), if err_open => {
                let read = read?;
                forward(sink, &mut captured, &mut err_line).await?;
                err_open = read != 0;
            }
        }
    }

    let status = child.wait().await?;
    let exit_code = status.code().unwrap_or(-1);

    debug!(
        "{} exited with code {} ({} bytes of output)",
        command.program,
        exit_code,
        captured.len()
    );

    Ok(ProcessOutput {
        exit_code,
        output: String::from_utf8_lossy(&captured).into_owned(),
    })
}

/// Hands a pending line to the sink and the capture buffer, then clears it
async fn forward(
    sink: &mut dyn OutputSink,
    captured: &mut Vec<u8>,
    line: &mut Vec<u8>,
) -> std::io::Result<()> {
    if line.is_empty() {
        return Ok(());
    }
    sink.write_line(line).await?;
    captured.extend_from_slice(line);
    line.clear();
    Ok(())
}
