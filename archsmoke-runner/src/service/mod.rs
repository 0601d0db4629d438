//! Service layer
//!
//! Services contain the business logic of one architecture's pipeline:
//! skip detection, remote-run execution and result reporting. Each one is a
//! trait so the scheduler can be exercised with in-memory fakes.

mod execution;
mod report;
mod skip;

use std::sync::Arc;

use crate::config::Config;
use archsmoke_client::ReportClient;

// Re-export traits
pub use execution::ExecutionService;
pub use report::ReportService;
pub use skip::SkipOracle;

// Re-export implementations
pub use execution::StandardExecutionService;
pub use report::StandardReportService;
pub use skip::ReportQueryOracle;

/// The three services a pipeline runs through, shared by all tasks
#[derive(Clone)]
pub struct Services {
    pub skip_oracle: Arc<dyn SkipOracle>,
    pub executor: Arc<dyn ExecutionService>,
    pub reporter: Arc<dyn ReportService>,
}

impl Services {
    /// Wires the standard subprocess-backed services from configuration
    pub fn from_config(config: &Config) -> Self {
        let report_client =
            ReportClient::new(config.report_cmd.clone(), config.production, config.debug);

        Self {
            skip_oracle: Arc::new(ReportQueryOracle::new(
                report_client.clone(),
                config.sentinel.clone(),
            )),
            executor: Arc::new(StandardExecutionService::from_config(config)),
            reporter: Arc::new(StandardReportService::new(report_client, config.backend)),
        }
    }
}
