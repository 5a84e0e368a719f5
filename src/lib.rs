//! Selector Probe (selprobe) Library
//!
//! A library for extracting web page content at CSS selector locations under
//! three rendering models: static HTML, iframe-embedded third-party widgets,
//! and client-rendered single-page applications.
//!
//! # Module Overview
//!
//! - [`strategy`] - Mode-specific extraction strategies, engine, and registry
//! - [`driver`] - The query-primitive boundary (`PageDriver`)
//! - [`browser`] - Headless browser backend (Node Playwright helper)
//! - [`runner`] - Run orchestration and session ownership
//! - [`config`] - Per-mode tuning, TOML config support
//! - [`types`] - Core data types (modes, outcomes, contexts)
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use selprobe_lib::{probe_url, Config, Mode, RunRequest, StrategyRegistry};
//!
//! # async fn example() -> selprobe_lib::Result<()> {
//! let registry = StrategyRegistry::with_builtins();
//! let config = Config::default();
//! let request = RunRequest {
//!     url: "https://example.com/careers".to_string(),
//!     selectors: vec!["#jobs .listing".to_string()],
//!     mode: Mode::ThirdPartyFrame,
//! };
//! let outcomes = probe_url(&request, &config, &registry).await?;
//! assert_eq!(outcomes.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod driver;
pub mod error;
pub mod output;
pub mod runner;
pub mod strategy;
pub mod types;

pub use browser::{ensure_node_available, ensure_playwright_available, BrowserSession, SessionOptions};
pub use config::{Config, StrategyConfig, DEFAULT_FRAME_CONTAINER};
pub use driver::{FrameResolution, PageDriver};
pub use error::{DriverError, ErrorCategory, ErrorPayload, ProbeError, Result};
pub use output::{ErrorOutput, ProbeOutput, ProbeReport, Summary, PROBE_OUTPUT_VERSION};
pub use runner::{probe_url, run_extraction, RunRequest};
pub use strategy::{registry::StrategyRegistry, Engine, StrategyBehavior};
pub use types::{
    ElementContent, ExtractionOutcome, FrameHandle, LoadState, Mode, NavigationStatus,
    QueryContext, QueryTarget, SOURCE_ABORTED, SOURCE_FRAME, SOURCE_MAIN_DOCUMENT,
    SOURCE_NAVIGATION_ERROR,
};
