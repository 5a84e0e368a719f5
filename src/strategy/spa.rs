//! Strategy for client-rendered single-page applications.
//!
//! No single signal reliably marks a client-rendered app as painted, so
//! readiness is a multi-stage heuristic: DOM-ready, a bootstrap grace pause,
//! a bounded poll for framework markers or a body-text threshold, and a
//! second grace pause for lazy-loaded sub-components. Every stage degrades
//! on expiry instead of failing the run.

use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::{base_extract, base_resolve, StrategyBehavior};
use crate::config::StrategyConfig;
use crate::driver::PageDriver;
use crate::types::{Mode, QueryContext};

pub fn behavior() -> StrategyBehavior {
    StrategyBehavior {
        mode: Mode::DynamicSpa,
        resolve_context: base_resolve,
        await_ready: ready_dynamic_content,
        extract_one: base_extract,
    }
}

fn ready_dynamic_content<'a>(
    driver: &'a dyn PageDriver,
    config: &'a StrategyConfig,
    ctx: &'a QueryContext,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        if let Err(err) = driver
            .wait_for_load_state(ctx.target(), config.load_state, config.ready_timeout)
            .await
        {
            warn!(%err, "load state not reached; proceeding");
        }

        tokio::time::sleep(config.bootstrap_grace).await;

        match driver
            .probe_readiness(
                &config.framework_markers,
                config.min_body_text,
                config.marker_timeout,
            )
            .await
        {
            Ok(true) => debug!("framework-rendered content detected"),
            Ok(false) => warn!(
                "no framework markers and body text below {} chars after {:?}; proceeding",
                config.min_body_text, config.marker_timeout
            ),
            Err(err) => warn!(%err, "readiness probe failed; proceeding"),
        }

        tokio::time::sleep(config.lazy_grace).await;
    })
}
