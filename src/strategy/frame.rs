//! Strategy for third-party iframe-embedded widgets.
//!
//! The embed container is looked up once per run. Whether it resolves to a
//! frame, resolves to a container without a reachable document, or never
//! appears, the run continues; the main document is the fallback target in
//! the latter two cases. Per-selector extraction tries the frame first and
//! retries against the main document with a strictly shorter budget.

use futures::future::BoxFuture;
use tracing::{info, warn};

use super::{extract_against, ready_load_state, StrategyBehavior};
use crate::config::StrategyConfig;
use crate::driver::{FrameResolution, PageDriver};
use crate::types::{ExtractionOutcome, Mode, QueryContext, QueryTarget, SOURCE_MAIN_DOCUMENT};

pub fn behavior() -> StrategyBehavior {
    StrategyBehavior {
        mode: Mode::ThirdPartyFrame,
        resolve_context: resolve_embed_context,
        await_ready: ready_load_state,
        extract_one: extract_with_fallback,
    }
}

/// Locate the well-known embed container and try to enter its document.
/// All three outcomes are non-fatal.
fn resolve_embed_context<'a>(
    driver: &'a dyn PageDriver,
    config: &'a StrategyConfig,
    mode: Mode,
) -> BoxFuture<'a, QueryContext> {
    Box::pin(async move {
        match driver
            .resolve_frame(&config.frame_container, config.frame_timeout)
            .await
        {
            Ok(FrameResolution::Frame(handle)) => {
                info!(container = %config.frame_container, "entered embedded frame");
                QueryContext::framed(mode, handle)
            }
            Ok(FrameResolution::ContainerWithoutFrame) => {
                warn!(
                    container = %config.frame_container,
                    "embed container present but its document is unreachable; using main document"
                );
                QueryContext::document(mode)
            }
            Ok(FrameResolution::NoContainer) => {
                warn!(
                    container = %config.frame_container,
                    "no embed container within {:?}; using main document",
                    config.frame_timeout
                );
                QueryContext::document(mode)
            }
            Err(err) => {
                warn!(%err, "embed container lookup failed; using main document");
                QueryContext::document(mode)
            }
        }
    })
}

/// Two-tier extraction: full budget against the frame, then a strictly
/// shorter retry against the main document. Without a frame this is the base
/// single-target path.
fn extract_with_fallback<'a>(
    driver: &'a dyn PageDriver,
    config: &'a StrategyConfig,
    ctx: &'a QueryContext,
    selector: &'a str,
) -> BoxFuture<'a, ExtractionOutcome> {
    Box::pin(async move {
        let Some(frame) = &ctx.frame else {
            return extract_against(
                driver,
                QueryTarget::Document,
                SOURCE_MAIN_DOCUMENT,
                selector,
                config.selector_timeout,
            )
            .await;
        };

        let primary = extract_against(
            driver,
            QueryTarget::Frame(frame),
            ctx.source_name(),
            selector,
            config.selector_timeout,
        )
        .await;
        if primary.found {
            return primary;
        }

        info!(
            selector = %selector,
            "selector not found in frame; retrying against main document"
        );
        extract_against(
            driver,
            QueryTarget::Document,
            SOURCE_MAIN_DOCUMENT,
            selector,
            config.fallback_timeout,
        )
        .await
    })
}
