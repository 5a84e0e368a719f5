//! Run orchestration: navigation, strategy selection, and session ownership.

use tracing::{error, info, warn};
use url::Url;

use crate::browser::{BrowserSession, SessionOptions};
use crate::config::Config;
use crate::driver::PageDriver;
use crate::error::Result;
use crate::strategy::{registry::StrategyRegistry, Engine};
use crate::types::{
    ExtractionOutcome, Mode, NavigationStatus, SOURCE_ABORTED, SOURCE_NAVIGATION_ERROR,
};

/// One extraction pass: a URL, the selectors to probe, and the rendering
/// model to assume.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub url: String,
    pub selectors: Vec<String>,
    pub mode: Mode,
}

/// Drives a single run over an already-navigable driver. Never fails: a hard
/// navigation failure terminates the run early with a uniform failure outcome
/// per selector, and the returned list always matches the input length and
/// order.
pub async fn run_extraction(
    driver: &dyn PageDriver,
    registry: &StrategyRegistry,
    config: &Config,
    request: &RunRequest,
) -> Vec<ExtractionOutcome> {
    info!(url = %request.url, mode = %request.mode, "navigating");
    match driver.navigate(&request.url, config.navigation_timeout).await {
        Ok(NavigationStatus::Complete) => {}
        Ok(NavigationStatus::TimedOut) => {
            warn!(
                "navigation exceeded {:?}; proceeding with whatever loaded",
                config.navigation_timeout
            );
        }
        Err(err) => {
            error!(%err, url = %request.url, "navigation failed; aborting run");
            return request
                .selectors
                .iter()
                .map(|selector| {
                    ExtractionOutcome::missed(selector, err.to_string(), SOURCE_NAVIGATION_ERROR)
                })
                .collect();
        }
    }

    let behavior = registry.resolve(request.mode);
    let strategy_config = config.strategy(request.mode).clone();
    let engine = Engine::new(driver, behavior, strategy_config);
    let mut outcomes = engine.execute(&request.selectors).await;
    backfill(&mut outcomes, &request.selectors);
    outcomes
}

/// Pads an aborted result list with synthetic failures so output length
/// always equals input length. The built-in engine never under-produces, but
/// registered third-party behaviors are not trusted to uphold that.
fn backfill(outcomes: &mut Vec<ExtractionOutcome>, selectors: &[String]) {
    while outcomes.len() < selectors.len() {
        let selector = &selectors[outcomes.len()];
        outcomes.push(ExtractionOutcome::missed(
            selector,
            "run aborted before this selector was attempted",
            SOURCE_ABORTED,
        ));
    }
    outcomes.truncate(selectors.len());
}

/// Composition point for the CLI: launches a browser session, runs the
/// extraction, and releases the session on every exit path.
pub async fn probe_url(
    request: &RunRequest,
    config: &Config,
    registry: &StrategyRegistry,
) -> Result<Vec<ExtractionOutcome>> {
    Url::parse(&request.url)?;

    let session = BrowserSession::launch(SessionOptions::from_config(config)).await?;
    // run_extraction absorbs everything but session startup, so the session
    // is always released here; kill_on_drop covers panics and cancellation.
    let outcomes = run_extraction(&session, registry, config, request).await;
    session.close().await;
    Ok(outcomes)
}
