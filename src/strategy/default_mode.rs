//! Strategy for static server-rendered HTML.

use tracing::debug;

use super::{base_extract, base_resolve, ready_load_state, StrategyBehavior};
use crate::types::Mode;

/// Main document only; wait for the configured lifecycle signal, then the
/// base per-selector extraction.
pub fn behavior() -> StrategyBehavior {
    debug!("using default strategy for standard HTML");
    StrategyBehavior {
        mode: Mode::Default,
        resolve_context: base_resolve,
        await_ready: ready_load_state,
        extract_one: base_extract,
    }
}
