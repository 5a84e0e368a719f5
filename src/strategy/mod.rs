//! The selector-extraction strategy subsystem.
//!
//! Each mode is a [`StrategyBehavior`]: a triple of async behaviors for
//! target resolution, readiness waiting, and per-selector extraction. Modes
//! compose the shared base behaviors in this module with their own overrides;
//! there is no inheritance chain, and the [`registry::StrategyRegistry`] maps
//! a [`Mode`](crate::types::Mode) to a behavior constructor.

pub mod default_mode;
pub mod frame;
pub mod registry;
pub mod spa;

use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::config::StrategyConfig;
use crate::driver::PageDriver;
use crate::types::{ExtractionOutcome, Mode, QueryContext, QueryTarget};

pub type ResolveFn =
    for<'a> fn(&'a dyn PageDriver, &'a StrategyConfig, Mode) -> BoxFuture<'a, QueryContext>;
pub type ReadyFn =
    for<'a> fn(&'a dyn PageDriver, &'a StrategyConfig, &'a QueryContext) -> BoxFuture<'a, ()>;
pub type ExtractFn = for<'a> fn(
    &'a dyn PageDriver,
    &'a StrategyConfig,
    &'a QueryContext,
    &'a str,
) -> BoxFuture<'a, ExtractionOutcome>;

/// Behavior triple for one mode.
pub struct StrategyBehavior {
    pub mode: Mode,
    pub resolve_context: ResolveFn,
    pub await_ready: ReadyFn,
    pub extract_one: ExtractFn,
}

/// The template pipeline shared by every mode: build the query context once,
/// wait for readiness, then extract each selector in input order.
pub struct Engine<'d> {
    driver: &'d dyn PageDriver,
    behavior: StrategyBehavior,
    config: StrategyConfig,
}

impl<'d> Engine<'d> {
    pub fn new(driver: &'d dyn PageDriver, behavior: StrategyBehavior, config: StrategyConfig) -> Self {
        Self {
            driver,
            behavior,
            config,
        }
    }

    /// Runs the pipeline. Always returns one outcome per selector, in input
    /// order; per-selector failures become outcome data, never errors.
    pub async fn execute(&self, selectors: &[String]) -> Vec<ExtractionOutcome> {
        let ctx =
            (self.behavior.resolve_context)(self.driver, &self.config, self.behavior.mode).await;
        (self.behavior.await_ready)(self.driver, &self.config, &ctx).await;

        let mut outcomes = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let outcome =
                (self.behavior.extract_one)(self.driver, &self.config, &ctx, selector).await;
            log_outcome(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn log_outcome(outcome: &ExtractionOutcome) {
    if outcome.found {
        info!(
            selector = %outcome.selector,
            source = %outcome.source_context,
            "extracted element content"
        );
    } else {
        warn!(
            selector = %outcome.selector,
            source = %outcome.source_context,
            error = outcome.error_message.as_deref().unwrap_or("unknown"),
            "selector produced no match"
        );
    }
}

/// Base target resolution: the main document, no frame.
pub fn base_resolve<'a>(
    _driver: &'a dyn PageDriver,
    _config: &'a StrategyConfig,
    mode: Mode,
) -> BoxFuture<'a, QueryContext> {
    Box::pin(async move { QueryContext::document(mode) })
}

/// Base readiness: none.
pub fn base_ready<'a>(
    _driver: &'a dyn PageDriver,
    _config: &'a StrategyConfig,
    _ctx: &'a QueryContext,
) -> BoxFuture<'a, ()> {
    Box::pin(async {})
}

/// Readiness shared by the default and frame modes: wait for the configured
/// lifecycle signal on the effective target; expiry degrades to "proceed with
/// partial content".
pub fn ready_load_state<'a>(
    driver: &'a dyn PageDriver,
    config: &'a StrategyConfig,
    ctx: &'a QueryContext,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        if let Err(err) = driver
            .wait_for_load_state(ctx.target(), config.load_state, config.ready_timeout)
            .await
        {
            warn!(
                target = ctx.source_name(),
                %err,
                "load state not reached; proceeding with partial content"
            );
        }
    })
}

/// Base extraction: one bounded wait-for-element query against the context's
/// effective target.
pub fn base_extract<'a>(
    driver: &'a dyn PageDriver,
    config: &'a StrategyConfig,
    ctx: &'a QueryContext,
    selector: &'a str,
) -> BoxFuture<'a, ExtractionOutcome> {
    Box::pin(extract_against(
        driver,
        ctx.target(),
        ctx.source_name(),
        selector,
        config.selector_timeout,
    ))
}

/// Issues a single bounded query and converts any failure into a not-found
/// outcome. This is the boundary no driver error crosses.
pub(crate) async fn extract_against(
    driver: &dyn PageDriver,
    target: QueryTarget<'_>,
    source: &str,
    selector: &str,
    timeout: Duration,
) -> ExtractionOutcome {
    match driver.wait_for_selector(target, selector, timeout).await {
        Ok(content) => ExtractionOutcome::matched(selector, content, source),
        Err(err) => ExtractionOutcome::missed(selector, err.to_string(), source),
    }
}
