//! Reporting backend types
//!
//! The reporting collaborator can publish a result either as a comment
//! carrying the artifacts URL, or by handing it the remote run's API URL so it
//! can fetch the detailed results itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::fields::ResultField;

/// Marker printed by the reporting query when an automated report exists
pub const DEFAULT_SENTINEL: &str = "bot touched this wiki";

/// How results are submitted to the tracking system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportBackend {
    /// `--comment <artifacts url> --status <result>`
    #[default]
    Comment,
    /// `--api-url <api url>`
    ApiUrl,
}

impl ReportBackend {
    /// Fields the remote run must have printed for this backend to submit
    pub fn required_fields(self) -> &'static [ResultField] {
        match self {
            ReportBackend::Comment => &[ResultField::ArtifactsUrl, ResultField::Results],
            ReportBackend::ApiUrl => &[ResultField::ApiUrl],
        }
    }
}

impl fmt::Display for ReportBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportBackend::Comment => f.write_str("comment"),
            ReportBackend::ApiUrl => f.write_str("api-url"),
        }
    }
}

impl FromStr for ReportBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comment" => Ok(ReportBackend::Comment),
            "api-url" | "api_url" | "api" => Ok(ReportBackend::ApiUrl),
            other => Err(format!(
                "unknown report backend '{}' (expected 'comment' or 'api-url')",
                other
            )),
        }
    }
}

/// Returns true if the query output shows a prior automated report
pub fn contains_sentinel(output: &str, sentinel: &str) -> bool {
    !sentinel.is_empty() && output.contains(sentinel)
}
