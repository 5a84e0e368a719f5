use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::types::{ExtractionOutcome, Mode};

/// Schema version for output payloads.
pub const PROBE_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProbeReport {
    Probe(ProbeOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutput {
    pub version: String,
    pub url: String,
    pub mode: Mode,
    pub outcomes: Vec<ExtractionOutcome>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub found: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

impl ProbeOutput {
    pub fn new(url: impl Into<String>, mode: Mode, outcomes: Vec<ExtractionOutcome>) -> Self {
        let summary = Summary {
            found: outcomes.iter().filter(|o| o.found).count(),
            total: outcomes.len(),
        };
        Self {
            version: PROBE_OUTPUT_VERSION.to_string(),
            url: url.into(),
            mode,
            outcomes,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementContent, SOURCE_FRAME, SOURCE_MAIN_DOCUMENT};

    #[test]
    fn probe_output_counts_found_outcomes() {
        let outcomes = vec![
            ExtractionOutcome::matched(
                "h1",
                ElementContent {
                    text: "Jobs".into(),
                    html: "<b>Jobs</b>".into(),
                },
                SOURCE_FRAME,
            ),
            ExtractionOutcome::missed("#missing", "no match", SOURCE_MAIN_DOCUMENT),
        ];
        let output = ProbeOutput::new("https://example.com", Mode::ThirdPartyFrame, outcomes);
        assert_eq!(output.summary.found, 1);
        assert_eq!(output.summary.total, 2);
    }

    #[test]
    fn probe_report_serializes_with_kind_tag() {
        let report = ProbeReport::Probe(ProbeOutput::new(
            "https://example.com",
            Mode::Default,
            vec![],
        ));
        let json = serde_json::to_string(&report).expect("serialize report");
        assert!(json.contains("\"kind\":\"probe\""));
        assert!(json.contains("\"mode\":\"default\""));
        assert!(json.contains("\"summary\""));
    }

    #[test]
    fn error_report_serializes_payload() {
        let err = crate::error::ProbeError::Config("bad flag".into());
        let report = ProbeReport::Error(ErrorOutput {
            version: PROBE_OUTPUT_VERSION.to_string(),
            message: Some("bad flag".into()),
            error: err.to_payload(),
        });
        let json = serde_json::to_string(&report).expect("serialize error report");
        assert!(json.contains("\"kind\":\"error\""));
        assert!(json.contains("\"category\":\"config\""));
    }
}
