use serde::{Deserialize, Serialize};

/// `source_context` value for a match made against the main document.
pub const SOURCE_MAIN_DOCUMENT: &str = "main-document";
/// `source_context` value for a match made inside an embedded frame.
pub const SOURCE_FRAME: &str = "frame";
/// `source_context` stamped on outcomes synthesized after a fatal navigation failure.
pub const SOURCE_NAVIGATION_ERROR: &str = "navigation-error";
/// `source_context` stamped on outcomes back-filled for an aborted run.
pub const SOURCE_ABORTED: &str = "aborted";

/// Rendering-model assumption for a run.
///
/// Chosen once per invocation; selects which strategy and readiness policy
/// apply. The registry keys on this, so it is `Hash + Eq`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Static server-rendered HTML.
    #[default]
    Default,
    /// Content embedded through a third-party iframe widget (job-board embeds).
    ThirdPartyFrame,
    /// Client-rendered single-page application with unpredictable readiness.
    DynamicSpa,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::ThirdPartyFrame => "frame",
            Mode::DynamicSpa => "spa",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier for a resolved embedded frame, issued by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHandle(String);

impl FrameHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// The document or frame a single driver query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget<'a> {
    Document,
    Frame(&'a FrameHandle),
}

/// Page-lifecycle signal a readiness wait keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadState {
    NetworkIdle,
    DomContentLoaded,
}

/// Rendered text and serialized inner markup captured from a matched element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementContent {
    pub text: String,
    pub html: String,
}

/// How navigating to the target URL ended.
///
/// A timeout is data, not an error: the run proceeds with whatever loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStatus {
    Complete,
    TimedOut,
}

/// Resolved query target for a run: the frame, when present, is the effective
/// target, otherwise the main document. Exactly one of the two is queried for
/// a given extraction attempt.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub mode: Mode,
    pub frame: Option<FrameHandle>,
}

impl QueryContext {
    pub fn document(mode: Mode) -> Self {
        Self { mode, frame: None }
    }

    pub fn framed(mode: Mode, frame: FrameHandle) -> Self {
        Self {
            mode,
            frame: Some(frame),
        }
    }

    pub fn target(&self) -> QueryTarget<'_> {
        match &self.frame {
            Some(handle) => QueryTarget::Frame(handle),
            None => QueryTarget::Document,
        }
    }

    /// Human-readable name of the effective target, recorded in outcomes.
    pub fn source_name(&self) -> &'static str {
        if self.frame.is_some() {
            SOURCE_FRAME
        } else {
            SOURCE_MAIN_DOCUMENT
        }
    }
}

/// One record per attempted selector. Never mutated after creation; appended
/// to the run's result list in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    pub selector: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub source_context: String,
}

impl ExtractionOutcome {
    pub fn matched(
        selector: impl Into<String>,
        content: ElementContent,
        source_context: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            found: true,
            text: Some(content.text),
            html: Some(content.html),
            error_message: None,
            source_context: source_context.into(),
        }
    }

    pub fn missed(
        selector: impl Into<String>,
        error_message: impl Into<String>,
        source_context: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            found: false,
            text: None,
            html: None,
            error_message: Some(error_message.into()),
            source_context: source_context.into(),
        }
    }
}
