//! The boundary between the strategy subsystem and the browser backend.
//!
//! Everything the core knows about a live page goes through [`PageDriver`].
//! The production implementation is [`crate::browser::BrowserSession`];
//! tests script a mock.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DriverError;
use crate::types::{ElementContent, FrameHandle, LoadState, NavigationStatus, QueryTarget};

/// How an embed-container lookup resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameResolution {
    /// Container present and its nested document reachable.
    Frame(FrameHandle),
    /// Container present but the nested document could not be obtained.
    ContainerWithoutFrame,
    /// No container appeared within the timeout.
    NoContainer,
}

/// Query primitives supplied by a browser-automation backend.
///
/// Every method is a bounded operation: it must resolve within the declared
/// timeout, returning a [`DriverError`] rather than hanging. The caller
/// decides whether a failure is fatal; for everything but `navigate` it
/// never is.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigates the page to `url`. A load that exceeds `timeout` is reported
    /// as [`NavigationStatus::TimedOut`], not as an error; only a hard
    /// DNS/connection-level failure returns [`DriverError::Navigation`].
    async fn navigate(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationStatus, DriverError>;

    /// Waits for a page-lifecycle signal on the given target.
    async fn wait_for_load_state(
        &self,
        target: QueryTarget<'_>,
        state: LoadState,
        timeout: Duration,
    ) -> Result<(), DriverError>;

    /// Waits for `selector` to match within `timeout` and captures the
    /// element's rendered text and inner markup.
    async fn wait_for_selector(
        &self,
        target: QueryTarget<'_>,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementContent, DriverError>;

    /// Looks for the embed container identified by `container_selector` and,
    /// when present, tries to obtain its nested document.
    async fn resolve_frame(
        &self,
        container_selector: &str,
        timeout: Duration,
    ) -> Result<FrameResolution, DriverError>;

    /// Polls the main document until any of `markers` matches or the body
    /// text reaches `min_body_text` characters. Returns `Ok(false)` when the
    /// poll times out without observing either signal.
    async fn probe_readiness(
        &self,
        markers: &[String],
        min_body_text: usize,
        timeout: Duration,
    ) -> Result<bool, DriverError>;

    /// Releases the underlying session. Best-effort; never fails.
    async fn close(&self);
}
