//! Result fields emitted by the remote test run
//!
//! The remote-run collaborator prints its summary as `KEY=VALUE` lines mixed
//! into ordinary log output. Only a fixed whitelist of keys is recognised and
//! the captured text is scanned, never evaluated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognised result key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultField {
    FinalState,
    Duration,
    ArtifactsUrl,
    ApiUrl,
    Results,
}

impl ResultField {
    /// Every recognised key, in the order the remote run prints them
    pub const ALL: [ResultField; 5] = [
        ResultField::FinalState,
        ResultField::Duration,
        ResultField::ArtifactsUrl,
        ResultField::ApiUrl,
        ResultField::Results,
    ];

    /// The key as it appears on the wire
    pub fn key(self) -> &'static str {
        match self {
            ResultField::FinalState => "FINAL_STATE",
            ResultField::Duration => "DURATION",
            ResultField::ArtifactsUrl => "ARTIFACTS_URL",
            ResultField::ApiUrl => "API_URL",
            ResultField::Results => "RESULTS",
        }
    }

    /// Looks up a key, ignoring ASCII case
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for ResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Typed values extracted from remote-run output
///
/// Every field is optional; which ones are required depends on the report
/// backend (see [`crate::domain::report::ReportBackend::required_fields`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFields {
    pub final_state: Option<String>,
    pub duration: Option<String>,
    pub artifacts_url: Option<String>,
    pub api_url: Option<String>,
    pub results: Option<String>,
}

impl ResultFields {
    /// Scans captured output for whitelisted `KEY=VALUE` lines
    ///
    /// Keys match case-insensitively, values are trimmed, and the last
    /// occurrence of a key wins. A key with an empty value clears any earlier
    /// value, since the remote run prints `artifacts_url=` when it has none.
    pub fn parse(output: &str) -> Self {
        let mut fields = Self::default();

        for line in output.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let Some(field) = ResultField::from_key(key.trim()) else {
                continue;
            };

            let value = value.trim();
            let value = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
            *fields.slot_mut(field) = value;
        }

        fields
    }

    /// Returns the value of a field, if present
    pub fn get(&self, field: ResultField) -> Option<&str> {
        match field {
            ResultField::FinalState => self.final_state.as_deref(),
            ResultField::Duration => self.duration.as_deref(),
            ResultField::ArtifactsUrl => self.artifacts_url.as_deref(),
            ResultField::ApiUrl => self.api_url.as_deref(),
            ResultField::Results => self.results.as_deref(),
        }
    }

    /// Returns the fields from `required` that are absent, preserving order
    pub fn missing(&self, required: &[ResultField]) -> Vec<ResultField> {
        required
            .iter()
            .copied()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    fn slot_mut(&mut self, field: ResultField) -> &mut Option<String> {
        match field {
            ResultField::FinalState => &mut self.final_state,
            ResultField::Duration => &mut self.duration,
            ResultField::ArtifactsUrl => &mut self.artifacts_url,
            ResultField::ApiUrl => &mut self.api_url,
            ResultField::Results => &mut self.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_fields() {
        let output = "\
INFO: Waiting for request to complete
FINAL_STATE=complete
DURATION=1.25h
ARTIFACTS_URL=https://artifacts.example/1
API_URL=https://api.example/requests/1
RESULTS=pass
";
        let fields = ResultFields::parse(output);
        assert_eq!(fields.final_state.as_deref(), Some("complete"));
        assert_eq!(fields.duration.as_deref(), Some("1.25h"));
        assert_eq!(
            fields.artifacts_url.as_deref(),
            Some("https://artifacts.example/1")
        );
        assert_eq!(
            fields.api_url.as_deref(),
            Some("https://api.example/requests/1")
        );
        assert_eq!(fields.results.as_deref(), Some("pass"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let output = "RESULTS=pass\nsomething else\nRESULTS=fail\n";
        let fields = ResultFields::parse(output);
        assert_eq!(fields.results.as_deref(), Some("fail"));
    }

    #[test]
    fn test_lowercase_keys_and_padded_values() {
        // The remote run prints `results= pass` via Python's print()
        let output = "final_state=complete\nresults= pass\r\n";
        let fields = ResultFields::parse(output);
        assert_eq!(fields.final_state.as_deref(), Some("complete"));
        assert_eq!(fields.results.as_deref(), Some("pass"));
    }

    #[test]
    fn test_empty_value_is_absent() {
        let output = "ARTIFACTS_URL=https://a/1\nARTIFACTS_URL=\n";
        let fields = ResultFields::parse(output);
        assert_eq!(fields.artifacts_url, None);
    }

    #[test]
    fn test_unknown_keys_and_noise_ignored() {
        let output = "PATH=/usr/bin\nrm -rf /; RESULTS=pass\nno equals sign here\n=orphan\n";
        let fields = ResultFields::parse(output);
        assert_eq!(fields, ResultFields::default());
    }

    #[test]
    fn test_value_may_contain_equals() {
        let fields = ResultFields::parse("API_URL=https://api.example/r?id=42&x=1\n");
        assert_eq!(
            fields.api_url.as_deref(),
            Some("https://api.example/r?id=42&x=1")
        );
    }

    #[test]
    fn test_missing_preserves_order() {
        let fields = ResultFields {
            results: Some("pass".to_string()),
            ..Default::default()
        };
        let missing = fields.missing(&[
            ResultField::ArtifactsUrl,
            ResultField::Results,
            ResultField::ApiUrl,
        ]);
        assert_eq!(missing, vec![ResultField::ArtifactsUrl, ResultField::ApiUrl]);
    }

    #[test]
    fn test_from_key() {
        assert_eq!(ResultField::from_key("api_url"), Some(ResultField::ApiUrl));
        assert_eq!(ResultField::from_key("RESULTS"), Some(ResultField::Results));
        assert_eq!(ResultField::from_key("RESULT"), None);
        assert_eq!(ResultField::ArtifactsUrl.to_string(), "ARTIFACTS_URL");
    }
}
