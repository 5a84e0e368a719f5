use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};
use crate::types::{LoadState, Mode};

/// Well-known container id for the supported job-board embed.
pub const DEFAULT_FRAME_CONTAINER: &str = "#grnhse_iframe";

/// Framework marker selectors polled by the SPA readiness heuristic.
fn default_framework_markers() -> Vec<String> {
    [
        ".ng-star-inserted",
        "[_ngcontent-ng-c]",
        "[data-reactroot]",
        "[data-v-app]",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Per-mode extraction tuning: which lifecycle signal to wait for, and the
/// timeout budget of each bounded operation in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StrategyConfig {
    /// Lifecycle signal the readiness wait keys on.
    pub load_state: LoadState,
    /// Bound on the lifecycle wait. Expiry is never fatal.
    #[serde(with = "humantime_serde")]
    pub ready_timeout: Duration,
    /// Per-selector extraction bound.
    #[serde(with = "humantime_serde")]
    pub selector_timeout: Duration,
    /// Bound for the main-document retry in frame mode. Must be strictly
    /// smaller than `selector_timeout`.
    #[serde(with = "humantime_serde")]
    pub fallback_timeout: Duration,
    /// Selector of the embed container to look for in frame mode.
    pub frame_container: String,
    /// Bound on the embed-container lookup.
    #[serde(with = "humantime_serde")]
    pub frame_timeout: Duration,
    /// Fixed pause after DOM-ready for framework bootstrap (SPA mode).
    #[serde(with = "humantime_serde")]
    pub bootstrap_grace: Duration,
    /// Fixed pause for lazy-loaded sub-components (SPA mode).
    #[serde(with = "humantime_serde")]
    pub lazy_grace: Duration,
    /// Bound on the framework-marker poll (SPA mode).
    #[serde(with = "humantime_serde")]
    pub marker_timeout: Duration,
    /// Selectors whose presence marks framework-rendered content.
    pub framework_markers: Vec<String>,
    /// Body-text length taken as evidence that non-trivial content painted.
    pub min_body_text: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            load_state: LoadState::NetworkIdle,
            ready_timeout: Duration::from_secs(10),
            selector_timeout: Duration::from_secs(5),
            fallback_timeout: Duration::from_secs(2),
            frame_container: DEFAULT_FRAME_CONTAINER.to_string(),
            frame_timeout: Duration::from_secs(5),
            bootstrap_grace: Duration::from_secs(1),
            lazy_grace: Duration::from_secs(2),
            marker_timeout: Duration::from_secs(10),
            framework_markers: default_framework_markers(),
            min_body_text: 200,
        }
    }
}

impl StrategyConfig {
    /// Built-in tuning for a mode. SPA pages materialize content late, so
    /// that mode keys its first stage on DOM-ready and gets a longer
    /// per-selector budget.
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Default | Mode::ThirdPartyFrame => Self::default(),
            Mode::DynamicSpa => Self {
                load_state: LoadState::DomContentLoaded,
                selector_timeout: Duration::from_secs(10),
                ..Self::default()
            },
        }
    }
}

/// Run-wide settings plus one [`StrategyConfig`] per mode. Loadable from a
/// TOML file; CLI flags override on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Bound on initial navigation. Expiry degrades to partial content.
    #[serde(with = "humantime_serde")]
    pub navigation_timeout: Duration,
    /// Node.js command used to spawn the browser helper.
    pub node_command: String,
    /// Passed through to the browser session; not interpreted by the core.
    pub headless: bool,
    #[serde(rename = "default")]
    pub default_mode: StrategyConfig,
    #[serde(rename = "frame")]
    pub frame_mode: StrategyConfig,
    #[serde(rename = "spa")]
    pub spa_mode: StrategyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(60),
            node_command: "node".to_string(),
            headless: true,
            default_mode: StrategyConfig::for_mode(Mode::Default),
            frame_mode: StrategyConfig::for_mode(Mode::ThirdPartyFrame),
            spa_mode: StrategyConfig::for_mode(Mode::DynamicSpa),
        }
    }
}

impl Config {
    pub fn strategy(&self, mode: Mode) -> &StrategyConfig {
        match mode {
            Mode::Default => &self.default_mode,
            Mode::ThirdPartyFrame => &self.frame_mode,
            Mode::DynamicSpa => &self.spa_mode,
        }
    }

    pub fn strategy_mut(&mut self, mode: Mode) -> &mut StrategyConfig {
        match mode {
            Mode::Default => &mut self.default_mode,
            Mode::ThirdPartyFrame => &mut self.frame_mode,
            Mode::DynamicSpa => &mut self.spa_mode,
        }
    }

    /// Load config from a TOML file, the central config, or defaults.
    /// Priority: explicit path > ~/.config/selprobe/config.toml > defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.exists()),
        };

        let Some(file) = candidate else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(&file).map_err(|e| {
            ProbeError::Config(format!("Failed to read config {}: {}", file.display(), e))
        })?;
        toml::from_str(&raw).map_err(|e| {
            ProbeError::Config(format!("Invalid config {}: {}", file.display(), e))
        })
    }

    pub fn central_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("selprobe").join("config.toml"))
    }

    /// Rejects settings that would break the pipeline's bounds: zero
    /// timeouts, and a frame fallback budget not strictly smaller than the
    /// primary selector budget.
    pub fn validate(&self) -> Result<()> {
        if self.navigation_timeout.is_zero() {
            return Err(ProbeError::Config(
                "navigation-timeout must be non-zero".to_string(),
            ));
        }
        for (name, strategy) in [
            ("default", &self.default_mode),
            ("frame", &self.frame_mode),
            ("spa", &self.spa_mode),
        ] {
            if strategy.selector_timeout.is_zero() || strategy.ready_timeout.is_zero() {
                return Err(ProbeError::Config(format!(
                    "[{name}] selector-timeout and ready-timeout must be non-zero"
                )));
            }
            if strategy.fallback_timeout >= strategy.selector_timeout {
                return Err(ProbeError::Config(format!(
                    "[{name}] fallback-timeout ({:?}) must be strictly smaller than selector-timeout ({:?})",
                    strategy.fallback_timeout, strategy.selector_timeout
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert_eq!(cfg.navigation_timeout, Duration::from_secs(60));
        assert_eq!(cfg.node_command, "node");
        assert!(cfg.headless);
        assert_eq!(cfg.default_mode.selector_timeout, Duration::from_secs(5));
        assert_eq!(cfg.default_mode.load_state, LoadState::NetworkIdle);
        assert_eq!(cfg.frame_mode.frame_container, DEFAULT_FRAME_CONTAINER);
        assert_eq!(cfg.frame_mode.fallback_timeout, Duration::from_secs(2));
        assert_eq!(cfg.spa_mode.selector_timeout, Duration::from_secs(10));
        assert_eq!(cfg.spa_mode.load_state, LoadState::DomContentLoaded);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn spa_selector_budget_exceeds_other_modes() {
        let cfg = Config::default();
        assert!(cfg.spa_mode.selector_timeout > cfg.default_mode.selector_timeout);
        assert!(cfg.spa_mode.selector_timeout > cfg.frame_mode.selector_timeout);
    }

    #[test]
    fn strategy_lookup_matches_mode() {
        let cfg = Config::default();
        assert_eq!(
            cfg.strategy(Mode::DynamicSpa).selector_timeout,
            Duration::from_secs(10)
        );
        assert_eq!(
            cfg.strategy(Mode::ThirdPartyFrame).frame_container,
            DEFAULT_FRAME_CONTAINER
        );
    }

    #[test]
    fn validate_rejects_fallback_not_smaller_than_primary() {
        let mut cfg = Config::default();
        cfg.frame_mode.fallback_timeout = cfg.frame_mode.selector_timeout;
        let err = cfg.validate().unwrap_err();
        assert!(
            err.to_string().contains("strictly smaller"),
            "expected monotonicity error, got: {err}"
        );
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let mut cfg = Config::default();
        cfg.spa_mode.selector_timeout = Duration::ZERO;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.navigation_timeout = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_reads_toml_overrides() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        writeln!(
            file,
            r##"
navigation-timeout = "20s"
node-command = "nodejs"

[frame]
frame-container = "#widget_frame"
selector-timeout = "8s"
fallback-timeout = "3s"

[spa]
min-body-text = 50
load-state = "dom-content-loaded"
"##
        )
        .expect("write config");

        let cfg = Config::load(Some(file.path())).expect("load config");
        assert_eq!(cfg.navigation_timeout, Duration::from_secs(20));
        assert_eq!(cfg.node_command, "nodejs");
        assert_eq!(cfg.frame_mode.frame_container, "#widget_frame");
        assert_eq!(cfg.frame_mode.selector_timeout, Duration::from_secs(8));
        assert_eq!(cfg.frame_mode.fallback_timeout, Duration::from_secs(3));
        assert_eq!(cfg.spa_mode.min_body_text, 50);
        assert_eq!(cfg.spa_mode.load_state, LoadState::DomContentLoaded);
        // Untouched sections keep defaults.
        assert_eq!(cfg.default_mode.selector_timeout, Duration::from_secs(5));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        writeln!(file, "navigation-timeout = [").expect("write config");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn load_without_path_falls_back_to_defaults() {
        // The central path is machine-dependent; absent a file there this
        // must come back with defaults rather than an error.
        let cfg = Config::load(None);
        assert!(cfg.is_ok() || Config::central_config_path().map_or(false, |p| p.exists()));
    }
}
