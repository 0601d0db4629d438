//! Orchestrator configuration
//!
//! Defines every parameter of a run: the architecture set, what to test, where
//! logs go, which collaborator commands to call and how to report. The
//! command line (see `main.rs`) fills this in; the scheduler only ever sees
//! the validated value.

use archsmoke_client::CommandSpec;
use archsmoke_core::domain::image::DEFAULT_STREAM;
use archsmoke_core::domain::job::JobDescriptor;
use archsmoke_core::domain::report::{DEFAULT_SENTINEL, ReportBackend};
use std::path::PathBuf;
use uuid::Uuid;

/// Architectures tested when none are given
pub const DEFAULT_ARCHITECTURES: [&str; 2] = ["x86_64", "aarch64"];

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Target architectures, one pipeline each
    pub architectures: Vec<String>,

    /// Repository holding the smoke-test plans
    pub git_url: String,

    /// Plan path inside the repository
    pub plan: String,

    /// Release stream whose image is tested (e.g. "rawhide")
    pub stream: String,

    /// Working directory for the remote-run command
    pub workdir: PathBuf,

    /// Base directory; logs land in `<log_base>/<YYYYMMDD>/<arch>/`
    pub log_base: PathBuf,

    /// How results are submitted
    pub backend: ReportBackend,

    /// Marker in the reporting query output that means "already reported"
    pub sentinel: String,

    /// Remote-run exit codes treated as success (0 is always included)
    pub accepted_exit_codes: Vec<i32>,

    /// Upper bound on concurrent pipelines, `None` for one task per architecture
    pub max_parallel: Option<usize>,

    /// Report to the production tracker instead of staging
    pub production: bool,

    /// Forward `--debug` to collaborators
    pub debug: bool,

    pub image_lookup_cmd: CommandSpec,
    pub remote_run_cmd: CommandSpec,
    pub report_cmd: CommandSpec,
}

impl Config {
    /// Creates a configuration with defaults for everything but the test source
    pub fn new(git_url: String, plan: String) -> Self {
        Self {
            architectures: DEFAULT_ARCHITECTURES.iter().map(|a| a.to_string()).collect(),
            git_url,
            plan,
            stream: DEFAULT_STREAM.to_string(),
            workdir: PathBuf::from("."),
            log_base: PathBuf::from("logs"),
            backend: ReportBackend::default(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            accepted_exit_codes: vec![0],
            max_parallel: None,
            production: false,
            debug: false,
            image_lookup_cmd: CommandSpec::new("./get_image_names.py"),
            remote_run_cmd: CommandSpec::new("./tft-wait.py"),
            report_cmd: CommandSpec::new("./report_results_noninteractive.py"),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.architectures.is_empty() {
            anyhow::bail!("at least one architecture is required");
        }

        for arch in &self.architectures {
            if arch.is_empty()
                || arch == "."
                || arch == ".."
                || arch.contains(['/', '\\'])
                || arch.chars().any(char::is_whitespace)
            {
                anyhow::bail!("invalid architecture name '{}'", arch);
            }
        }

        if self.git_url.is_empty() {
            anyhow::bail!("git_url cannot be empty");
        }

        if self.plan.is_empty() {
            anyhow::bail!("plan cannot be empty");
        }

        if self.stream.is_empty() {
            anyhow::bail!("stream cannot be empty");
        }

        if self.sentinel.is_empty() {
            anyhow::bail!("sentinel cannot be empty");
        }

        if self.max_parallel == Some(0) {
            anyhow::bail!("max_parallel must be greater than 0");
        }

        for cmd in [&self.image_lookup_cmd, &self.remote_run_cmd, &self.report_cmd] {
            if cmd.program.is_empty() {
                anyhow::bail!("collaborator command cannot be empty");
            }
        }

        Ok(())
    }

    /// Architectures in configured order with duplicates removed
    pub fn unique_architectures(&self) -> Vec<String> {
        let mut seen = Vec::with_capacity(self.architectures.len());
        for arch in &self.architectures {
            if !seen.contains(arch) {
                seen.push(arch.clone());
            }
        }
        seen
    }

    /// Builds one job descriptor per architecture
    pub fn descriptors(&self, run_id: Uuid) -> Vec<JobDescriptor> {
        self.unique_architectures()
            .into_iter()
            .map(|architecture| JobDescriptor {
                run_id,
                architecture,
                distro_image: self.stream.clone(),
                git_url: self.git_url.clone(),
                plan: self.plan.clone(),
                workdir: self.workdir.clone(),
            })
            .collect()
    }
}
