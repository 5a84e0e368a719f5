use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

/// Recoverable failure from a single driver operation.
///
/// Every variant except `Navigation` is absorbed at the smallest possible
/// scope (per selector or per readiness check) and converted into outcome
/// data or a log line. `Navigation` is the one kind allowed to short-circuit
/// a run, and only out of [`crate::driver::PageDriver::navigate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("no element matched selector {selector:?}")]
    NotFound { selector: String },

    #[error("embed container is present but its frame document is unreachable")]
    FrameUnavailable,

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("driver error: {0}")]
    Internal(String),
}

/// Process-level error for everything outside the per-selector boundary:
/// configuration, session startup, output writing.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser driver error: {0}")]
    Driver(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            ProbeError::Io(e) => ErrorPayload::new(
                ErrorCategory::Io,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            ProbeError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Url,
                e.to_string(),
                "Pass an absolute URL (e.g., https://example.com/careers).",
            ),
            ProbeError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check output flags; rerun with --verbose for details.",
            ),
            ProbeError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("playwright npm package is missing") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Install Playwright (e.g., `npm install playwright` and `npx playwright install chromium`).",
                    )
                } else if lower.contains("node command") || lower.contains("not found on path") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Install Node.js and ensure the node binary is on PATH, or pass --node-command.",
                    )
                } else if lower.contains("timeout") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Increase --nav-timeout/--ready-timeout/--selector-timeout, and ensure the page finishes loading.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags and config file values (timeouts must be non-zero; fallback shorter than primary).",
                    )
                }
            }
            ProbeError::Driver(msg) => ErrorPayload::new(
                ErrorCategory::Driver,
                msg.to_string(),
                "Rerun with --verbose; verify Node.js and Playwright with `selprobe check`.",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Driver,
    Url,
    Io,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
