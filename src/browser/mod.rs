//! Headless browser backend: a long-lived Node Playwright helper process
//! driven over line-delimited JSON.

pub(crate) mod helper;
pub mod session;

pub use helper::{ensure_node_available, ensure_playwright_available};
pub use session::{BrowserSession, SessionOptions, DEFAULT_COMMAND_GRACE};
