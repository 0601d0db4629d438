//! End-of-run operator summary

use archsmoke_core::domain::job::{JobOutcome, JobStatus};
use colored::*;
use std::io::{self, Write};

use crate::scheduler::RunSummary;

/// Writes one line per architecture, then the log directory on failure
pub fn print_summary(out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", format!("Run {}:", summary.run_id).bold())?;
    for outcome in &summary.outcomes {
        writeln!(out, "  {} {}", "▸".cyan(), outcome_line(outcome))?;
        if let Some(message) = &outcome.error_message {
            writeln!(out, "    {}", message.dimmed())?;
        }
    }
    writeln!(out)?;

    if summary.is_success() {
        writeln!(
            out,
            "{}",
            "✓ All architectures passed or were skipped".green().bold()
        )?;
    } else {
        writeln!(
            out,
            "{}",
            format!(
                "✗ {} of {} architecture(s) failed",
                summary.failed().count(),
                summary.outcomes.len()
            )
            .red()
            .bold()
        )?;
        writeln!(out, "  Logs: {}", summary.log_dir.display())?;
    }
    out.flush()
}

fn outcome_line(outcome: &JobOutcome) -> String {
    let artifacts = outcome.fields.artifacts_url.as_deref().unwrap_or("-");
    format!(
        "{:<10} {:<8} exit={:<4} {}",
        outcome.architecture.bold(),
        colorize_status(outcome.status()),
        outcome.exit_code,
        artifacts
    )
}

fn colorize_status(status: JobStatus) -> ColoredString {
    match status {
        JobStatus::Skipped => "SKIPPED".dimmed(),
        JobStatus::Passed => "PASSED".green(),
        JobStatus::Failed => "FAILED".red(),
    }
}
