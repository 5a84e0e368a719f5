mod cli;
mod formatting;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use selprobe_lib::{
    ensure_node_available, ensure_playwright_available, probe_url, Mode, ProbeOutput, ProbeReport,
    RunRequest, StrategyRegistry,
};

use cli::{Cli, Commands, OutputFormat};
use formatting::{exit_code_for_probe, render_error, write_output};
use settings::{apply_overrides, format_effective_config, load_config, ProbeOverrides};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("selprobe={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();
    init_tracing(cli.verbose);

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
            let overrides = ProbeOverrides {
                headless,
                nav_timeout,
                ready_timeout,
                selector_timeout,
                fallback_timeout,
                node_command,
            };
            run_probe(
                url,
                selectors,
                mode.into(),
                overrides,
                cli.config,
                cli.verbose,
                format,
                output,
            )
            .await
        }
        Commands::Check { node_command } => run_check(node_command).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_probe(
    url: String,
    selectors: Vec<String>,
    mode: Mode,
    overrides: ProbeOverrides,
    config_path: Option<PathBuf>,
    verbose: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => return ExitCode::from(render_error(err, format, output)),
    };
    if let Err(err) = apply_overrides(&mut config, mode, &overrides) {
        return ExitCode::from(render_error(err, format, output));
    }
    if verbose {
        eprintln!(
            "{}",
            format_effective_config(&config, mode, config_path.as_deref())
        );
    }

    let registry = StrategyRegistry::with_builtins();
    let request = RunRequest {
        url,
        selectors,
        mode,
    };

    let outcomes = match probe_url(&request, &config, &registry).await {
        Ok(outcomes) => outcomes,
        Err(err) => return ExitCode::from(render_error(err, format, output)),
    };

    let code = exit_code_for_probe(&outcomes);
    let report = ProbeReport::Probe(ProbeOutput::new(request.url.as_str(), mode, outcomes));
    if let Err(err) = write_output(&report, format, output) {
        eprintln!("Failed to write output: {}", err);
        return ExitCode::from(2);
    }
    ExitCode::from(code)
}

async fn run_check(node_command: Option<String>) -> ExitCode {
    let node_command = node_command.unwrap_or_else(|| "node".to_string());

    if let Err(err) = ensure_node_available(&node_command).await {
        return ExitCode::from(render_error(err, OutputFormat::Pretty, None));
    }
    println!("Node.js: OK ({})", node_command);

    if let Err(err) = ensure_playwright_available(&node_command).await {
        return ExitCode::from(render_error(err, OutputFormat::Pretty, None));
    }
    println!("Playwright: OK");
    println!("selprobe {} is ready to probe.", env!("CARGO_PKG_VERSION"));
    ExitCode::SUCCESS
}
