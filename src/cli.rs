use clap::{Parser, Subcommand, ValueEnum};
use selprobe_lib::Mode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "selprobe")]
#[command(
    version,
    about = "Selector Probe - Extract web page content at CSS selectors",
    long_about = "Selector Probe (selprobe)\n\nModes:\n- probe: navigate to a URL and extract content at each CSS selector, using a\n  rendering-model strategy (default HTML, third-party iframe embed, or SPA).\n- check: verify that Node.js and the Playwright npm package are available.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for timeouts/markers/container; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Navigate to a URL and extract content at each CSS selector
    Probe {
        #[arg(long, help = "URL to probe")]
        url: String,

        #[arg(
            long = "selector",
            value_name = "CSS",
            required = true,
            help = "CSS selector to extract (repeatable; outcomes keep this order)"
        )]
        selectors: Vec<String>,

        #[arg(
            long,
            value_enum,
            default_value = "default",
            help = "Rendering-model strategy to apply"
        )]
        mode: ModeArg,

        #[arg(
            long,
            value_name = "BOOL",
            help = "Run the browser headless (true/false)"
        )]
        headless: Option<bool>,

        #[arg(long, help = "Navigation timeout (seconds); expiry is non-fatal")]
        nav_timeout: Option<u64>,

        #[arg(long, help = "Readiness wait timeout (seconds) for the selected mode")]
        ready_timeout: Option<u64>,

        #[arg(long, help = "Per-selector extraction timeout (seconds) for the selected mode")]
        selector_timeout: Option<u64>,

        #[arg(
            long,
            help = "Main-document fallback timeout (seconds) in frame mode; must be shorter than --selector-timeout"
        )]
        fallback_timeout: Option<u64>,

        #[arg(long, help = "Node.js command used to spawn the browser helper")]
        node_command: Option<String>,

        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Verify that Node.js and the Playwright npm package are available
    Check {
        #[arg(long, help = "Node.js command to check")]
        node_command: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Default,
    Frame,
    Spa,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Default => Mode::Default,
            ModeArg::Frame => Mode::ThirdPartyFrame,
            ModeArg::Spa => Mode::DynamicSpa,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, ModeArg, OutputFormat};
    use clap::Parser;
    use selprobe_lib::Mode;

    #[test]
    fn probe_command_uses_defaults() {
        let cli = Cli::parse_from([
            "selprobe",
            "probe",
            "--url",
            "https://example.com/careers",
            "--selector",
            "#jobs",
        ]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());

        match cli.command {
            Commands::Probe {
                url,
                selectors,
                mode,
                headless,
                nav_timeout,
                ready_timeout,
                selector_timeout,
                fallback_timeout,
                node_command,
                format,
                output,
            } => {
                assert_eq!(url, "https://example.com/careers");
                assert_eq!(selectors, vec!["#jobs".to_string()]);
                assert!(matches!(mode, ModeArg::Default));
                assert!(headless.is_none());
                assert!(nav_timeout.is_none());
                assert!(ready_timeout.is_none());
                assert!(selector_timeout.is_none());
                assert!(fallback_timeout.is_none());
                assert!(node_command.is_none());
                assert!(matches!(format, OutputFormat::Pretty));
                assert!(output.is_none());
            }
            _ => panic!("expected probe command"),
        }
    }

    #[test]
    fn probe_command_respects_overrides_and_selector_order() {
        let cli = Cli::parse_from([
            "selprobe",
            "probe",
            "--url",
            "https://example.com",
            "--selector",
            "#first",
            "--selector",
            ".second",
            "--mode",
            "frame",
            "--headless",
            "false",
            "--nav-timeout",
            "20",
            "--ready-timeout",
            "8",
            "--selector-timeout",
            "6",
            "--fallback-timeout",
            "3",
            "--node-command",
            "nodejs",
            "--format",
            "json",
            "--output",
            "report.json",
            "--config",
            "selprobe.toml",
        ]);

        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("selprobe.toml")));

        match cli.command {
            Commands::Probe {
                selectors,
                mode,
                headless,
                nav_timeout,
                ready_timeout,
                selector_timeout,
                fallback_timeout,
                node_command,
                format,
                output,
                ..
            } => {
                assert_eq!(selectors, vec!["#first".to_string(), ".second".to_string()]);
                assert_eq!(Mode::from(mode), Mode::ThirdPartyFrame);
                assert_eq!(headless, Some(false));
                assert_eq!(nav_timeout, Some(20));
                assert_eq!(ready_timeout, Some(8));
                assert_eq!(selector_timeout, Some(6));
                assert_eq!(fallback_timeout, Some(3));
                assert_eq!(node_command.as_deref(), Some("nodejs"));
                assert!(matches!(format, OutputFormat::Json));
                assert_eq!(output.as_deref(), Some(std::path::Path::new("report.json")));
            }
            _ => panic!("expected probe command with overrides"),
        }
    }

    #[test]
    fn probe_requires_at_least_one_selector() {
        let result = Cli::try_parse_from(["selprobe", "probe", "--url", "https://example.com"]);
        assert!(result.is_err());
    }

    #[test]
    fn mode_arg_maps_onto_library_modes() {
        assert_eq!(Mode::from(ModeArg::Default), Mode::Default);
        assert_eq!(Mode::from(ModeArg::Frame), Mode::ThirdPartyFrame);
        assert_eq!(Mode::from(ModeArg::Spa), Mode::DynamicSpa);
    }

    #[test]
    fn check_command_sets_verbose() {
        let cli = Cli::parse_from(["selprobe", "--verbose", "check"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Check { node_command: None }));
    }
}
