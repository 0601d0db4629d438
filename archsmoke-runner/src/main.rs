//! Archsmoke
//!
//! Runs a smoke test of one release image on several CPU architectures in
//! parallel and reports each architecture's result to the test tracker.
//!
//! Architecture:
//! - Configuration: command line with environment fallbacks
//! - Repository: per-run, per-architecture log directories
//! - Services: skip detection, remote-run execution, result reporting
//! - Scheduler: one pipeline task per architecture, joined into a summary
//!
//! The process exits 0 only if every architecture was skipped or passed.

mod config;
mod context;
mod error;
mod repository;
mod scheduler;
mod service;
mod summary;

use anyhow::Context as _;
use archsmoke_client::CommandSpec;
use archsmoke_core::domain::report::{DEFAULT_SENTINEL, ReportBackend};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::Config;
use crate::repository::LogRoot;
use crate::scheduler::ArchScheduler;
use crate::service::Services;

/// Exit code for a configuration the run cannot start with
const EXIT_INVALID_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "archsmoke")]
#[command(about = "Multi-architecture smoke-test orchestrator", long_about = None)]
struct Cli {
    /// Target architecture (repeatable; defaults to x86_64 and aarch64)
    #[arg(long = "arch", env = "ARCHSMOKE_ARCHES", value_delimiter = ',')]
    architectures: Vec<String>,

    /// Repository holding the test plans
    #[arg(long, env = "ARCHSMOKE_GIT_URL")]
    git_url: String,

    /// Plan path inside the repository
    #[arg(long, env = "ARCHSMOKE_PLAN")]
    plan: String,

    /// Release stream whose image is tested
    #[arg(long, env = "ARCHSMOKE_STREAM", default_value = "rawhide")]
    stream: String,

    /// Working directory for the remote-run command
    #[arg(long, env = "ARCHSMOKE_WORKDIR", default_value = ".")]
    workdir: PathBuf,

    /// Base directory for per-run log directories
    #[arg(long, env = "ARCHSMOKE_LOG_ROOT", default_value = "logs")]
    log_root: PathBuf,

    /// Reporting backend (comment or api-url)
    #[arg(long, env = "ARCHSMOKE_BACKEND", default_value = "comment")]
    backend: ReportBackend,

    /// Text marking an architecture as already reported
    #[arg(long, env = "ARCHSMOKE_SENTINEL", default_value = DEFAULT_SENTINEL)]
    sentinel: String,

    /// Extra remote-run exit code treated as success (repeatable)
    #[arg(long, env = "ARCHSMOKE_ACCEPT_EXIT_CODES", value_delimiter = ',')]
    accept_exit_code: Vec<i32>,

    /// Maximum number of concurrent pipelines
    #[arg(long, env = "ARCHSMOKE_MAX_PARALLEL")]
    max_parallel: Option<usize>,

    /// Report to the production tracker
    #[arg(long, env = "ARCHSMOKE_PRODUCTION")]
    production: bool,

    /// Verbose logging, forwarded to collaborators
    #[arg(long, env = "ARCHSMOKE_DEBUG")]
    debug: bool,

    /// Image lookup command: program plus leading arguments, quote words with spaces
    #[arg(
        long,
        env = "ARCHSMOKE_IMAGE_LOOKUP_CMD",
        default_value = "./get_image_names.py"
    )]
    image_lookup_cmd: CommandSpec,

    /// Remote-run command: program plus leading arguments, quote words with spaces
    #[arg(long, env = "ARCHSMOKE_REMOTE_RUN_CMD", default_value = "./tft-wait.py")]
    remote_run_cmd: CommandSpec,

    /// Reporting command: program plus leading arguments, quote words with spaces
    #[arg(
        long,
        env = "ARCHSMOKE_REPORT_CMD",
        default_value = "./report_results_noninteractive.py"
    )]
    report_cmd: CommandSpec,
}

impl Cli {
    /// Builds the runner configuration, defaults filling unset values
    fn into_config(self) -> Config {
        let mut config = Config::new(self.git_url, self.plan);
        if !self.architectures.is_empty() {
            config.architectures = self.architectures;
        }
        config.stream = self.stream;
        config.workdir = self.workdir;
        config.log_base = self.log_root;
        config.backend = self.backend;
        config.sentinel = self.sentinel;
        config.accepted_exit_codes.extend(self.accept_exit_code);
        config.max_parallel = self.max_parallel;
        config.production = self.production;
        config.debug = self.debug;
        config.image_lookup_cmd = self.image_lookup_cmd;
        config.remote_run_cmd = self.remote_run_cmd;
        config.report_cmd = self.report_cmd;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.debug {
        "archsmoke_runner=debug,archsmoke_client=debug"
    } else {
        "archsmoke_runner=info,archsmoke_client=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.into_config();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {:#}", e);
        return ExitCode::from(EXIT_INVALID_CONFIG);
    }

    match run(config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs every architecture's pipeline and prints the summary
async fn run(config: Config) -> anyhow::Result<u8> {
    let run_id = Uuid::new_v4();
    info!(
        "Starting run {}: stream={}, architectures={:?}, backend={}",
        run_id, config.stream, config.architectures, config.backend
    );

    let log_root = LogRoot::for_today(&config.log_base);
    tokio::fs::create_dir_all(log_root.path())
        .await
        .with_context(|| {
            format!(
                "Failed to create log directory {}",
                log_root.path().display()
            )
        })?;

    let services = Services::from_config(&config);
    let scheduler = ArchScheduler::new(log_root, services, config.max_parallel);
    let summary = scheduler.run(run_id, config.descriptors(run_id)).await;

    summary::print_summary(&mut std::io::stdout().lock(), &summary)
        .context("Failed to print run summary")?;
    Ok(summary.exit_code())
}
