use std::path::Path;
use std::time::Duration;

use selprobe_lib::{Config, Mode, ProbeError};

/// CLI overrides for one probe invocation. Timeout flags apply to the
/// selected mode's strategy section only.
#[derive(Debug, Default, Clone)]
pub struct ProbeOverrides {
    pub headless: Option<bool>,
    pub nav_timeout: Option<u64>,
    pub ready_timeout: Option<u64>,
    pub selector_timeout: Option<u64>,
    pub fallback_timeout: Option<u64>,
    pub node_command: Option<String>,
}

/// Load config from a TOML file, the central config, or defaults, then
/// validate. Priority: explicit path > ~/.config/selprobe/config.toml >
/// defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ProbeError> {
    let cfg = Config::load(path)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Merge CLI flags over the loaded config, preferring flags when present.
/// Validates the merged result so a flag cannot smuggle in an inconsistent
/// timeout pair.
pub fn apply_overrides(
    config: &mut Config,
    mode: Mode,
    overrides: &ProbeOverrides,
) -> Result<(), ProbeError> {
    if let Some(headless) = overrides.headless {
        config.headless = headless;
    }
    if let Some(node_command) = &overrides.node_command {
        config.node_command = node_command.clone();
    }
    if let Some(secs) = overrides.nav_timeout {
        config.navigation_timeout = Duration::from_secs(secs);
    }

    let strategy = config.strategy_mut(mode);
    if let Some(secs) = overrides.ready_timeout {
        strategy.ready_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = overrides.selector_timeout {
        strategy.selector_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = overrides.fallback_timeout {
        strategy.fallback_timeout = Duration::from_secs(secs);
    }

    config.validate()
}

/// One-line effective-config summary for verbose mode.
pub fn format_effective_config(config: &Config, mode: Mode, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let strategy = config.strategy(mode);
    format!(
        "Effective config [{source}]: mode={}, nav={}s, ready={}s, selector={}s, fallback={}s, container={}, headless={}, node={}",
        mode,
        config.navigation_timeout.as_secs(),
        strategy.ready_timeout.as_secs(),
        strategy.selector_timeout.as_secs(),
        strategy.fallback_timeout.as_secs(),
        strategy.frame_container,
        config.headless,
        config.node_command
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_overrides_prefers_flags_when_present() {
        let mut config = Config::default();
        let overrides = ProbeOverrides {
            headless: Some(false),
            nav_timeout: Some(20),
            ready_timeout: Some(4),
            selector_timeout: Some(8),
            fallback_timeout: Some(3),
            node_command: Some("nodejs".to_string()),
        };

        apply_overrides(&mut config, Mode::ThirdPartyFrame, &overrides).expect("valid overrides");

        assert!(!config.headless);
        assert_eq!(config.node_command, "nodejs");
        assert_eq!(config.navigation_timeout, Duration::from_secs(20));
        let frame = config.strategy(Mode::ThirdPartyFrame);
        assert_eq!(frame.ready_timeout, Duration::from_secs(4));
        assert_eq!(frame.selector_timeout, Duration::from_secs(8));
        assert_eq!(frame.fallback_timeout, Duration::from_secs(3));
        // Other modes stay untouched.
        assert_eq!(
            config.strategy(Mode::Default).selector_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn apply_overrides_keeps_config_when_flags_absent() {
        let mut config = Config::default();
        apply_overrides(&mut config, Mode::Default, &ProbeOverrides::default())
            .expect("no-op overrides");
        assert!(config.headless);
        assert_eq!(config.navigation_timeout, Duration::from_secs(60));
    }

    #[test]
    fn apply_overrides_rejects_inconsistent_timeouts() {
        let mut config = Config::default();
        let overrides = ProbeOverrides {
            selector_timeout: Some(2),
            fallback_timeout: Some(2),
            ..ProbeOverrides::default()
        };
        let err = apply_overrides(&mut config, Mode::ThirdPartyFrame, &overrides).unwrap_err();
        assert!(err.to_string().contains("strictly smaller"));
    }

    #[test]
    fn format_effective_config_includes_all_fields() {
        let config = Config::default();
        let summary = format_effective_config(
            &config,
            Mode::ThirdPartyFrame,
            Some(Path::new("selprobe.toml")),
        );
        assert!(summary.contains("selprobe.toml"));
        assert!(summary.contains("mode=frame"));
        assert!(summary.contains("nav=60s"));
        assert!(summary.contains("selector=5s"));
        assert!(summary.contains("fallback=2s"));
        assert!(summary.contains("#grnhse_iframe"));
    }
}
