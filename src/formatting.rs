use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use selprobe_lib::output::PROBE_OUTPUT_VERSION;
use selprobe_lib::{ErrorOutput, ExtractionOutcome, ProbeError, ProbeOutput, ProbeReport};

use crate::cli::OutputFormat;

/// Text previews are cut at this many characters.
const TEXT_PREVIEW_LIMIT: usize = 500;
/// Markup previews are cut at this many characters.
const HTML_PREVIEW_LIMIT: usize = 300;

/// Write output in the requested format.
pub fn write_output(
    report: &ProbeReport,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(report, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(report, output.as_deref())?,
    };
    Ok(())
}

/// Exit code for fatal errors; missing selectors use [`EXIT_SELECTORS_MISSING`].
pub const EXIT_FATAL: u8 = 2;
/// Exit code when the probe ran but at least one selector was not found.
pub const EXIT_SELECTORS_MISSING: u8 = 1;

/// Render an error and return the fatal exit code.
pub fn render_error(err: ProbeError, format: OutputFormat, output: Option<PathBuf>) -> u8 {
    let payload = err.to_payload();
    let report = ProbeReport::Error(ErrorOutput {
        version: PROBE_OUTPUT_VERSION.to_string(),
        message: Some(payload.message.clone()),
        error: payload,
    });

    if let Err(write_err) = write_output(&report, format, output) {
        eprintln!("Failed to write error output: {}", write_err);
    }

    EXIT_FATAL
}

fn write_json_output(
    report: &ProbeReport,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(report)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn write_pretty_output(report: &ProbeReport, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(report, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content = serde_json::to_string_pretty(report)
        .unwrap_or_else(|_| "{\"kind\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format a report for human consumption in a terminal.
pub fn format_pretty(report: &ProbeReport, colorize: bool) -> String {
    match report {
        ProbeReport::Probe(out) => format_probe(out, colorize),
        ProbeReport::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn format_probe(out: &ProbeOutput, colorize: bool) -> String {
    let mut buf = String::new();
    writeln!(buf, "{}", "=".repeat(80)).ok();
    writeln!(buf, "PROBING: {} (mode: {})", out.url, out.mode).ok();
    writeln!(buf, "SELECTORS: {}", out.summary.total).ok();
    writeln!(buf, "{}", "=".repeat(80)).ok();

    for (i, outcome) in out.outcomes.iter().enumerate() {
        writeln!(buf).ok();
        writeln!(buf, "[{}/{}] SELECTOR: {}", i + 1, out.summary.total, outcome.selector).ok();
        writeln!(buf, "{}", "-".repeat(60)).ok();
        write_outcome(&mut buf, outcome, colorize);
    }

    writeln!(buf).ok();
    writeln!(buf, "{}", "=".repeat(80)).ok();
    let summary = format!("{}/{} selectors found", out.summary.found, out.summary.total);
    let code = if out.summary.found == out.summary.total {
        "32"
    } else {
        "33"
    };
    writeln!(buf, "SUMMARY: {}", color(&summary, code, colorize)).ok();
    buf
}

fn write_outcome(buf: &mut String, outcome: &ExtractionOutcome, colorize: bool) {
    if outcome.found {
        let banner = color("FOUND", "32", colorize);
        writeln!(buf, "{} in {}", banner, outcome.source_context).ok();

        if let Some(text) = &outcome.text {
            writeln!(buf, "TEXT ({} chars):", text.chars().count()).ok();
            writeln!(buf, "{}", truncate_preview(text, TEXT_PREVIEW_LIMIT)).ok();
        }
        if let Some(html) = &outcome.html {
            writeln!(buf, "HTML ({} chars):", html.chars().count()).ok();
            writeln!(buf, "{}", truncate_preview(html, HTML_PREVIEW_LIMIT)).ok();
        }
    } else {
        let banner = color("NOT FOUND", "31", colorize);
        writeln!(buf, "{} (last tried: {})", banner, outcome.source_context).ok();
        if let Some(message) = &outcome.error_message {
            writeln!(buf, "Error: {}", message).ok();
        }
    }
}

/// First `limit` characters, with an ellipsis when content was cut.
fn truncate_preview(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }
    let mut preview: String = content.chars().take(limit).collect();
    preview.push_str("...");
    preview
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Exit code for a completed probe: success only when every selector matched.
pub fn exit_code_for_probe(outcomes: &[ExtractionOutcome]) -> u8 {
    if outcomes.iter().all(|o| o.found) {
        0
    } else {
        EXIT_SELECTORS_MISSING
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selprobe_lib::{ElementContent, Mode, SOURCE_FRAME, SOURCE_MAIN_DOCUMENT};

    fn sample_output() -> ProbeOutput {
        ProbeOutput::new(
            "https://example.com/careers",
            Mode::ThirdPartyFrame,
            vec![
                ExtractionOutcome::matched(
                    "#jobs",
                    ElementContent {
                        text: "Open roles".into(),
                        html: "<ul><li>Role</li></ul>".into(),
                    },
                    SOURCE_FRAME,
                ),
                ExtractionOutcome::missed("#missing", "timed out after 5s", SOURCE_MAIN_DOCUMENT),
            ],
        )
    }

    #[test]
    fn exit_code_maps_found_and_missing() {
        let out = sample_output();
        assert_eq!(exit_code_for_probe(&out.outcomes), EXIT_SELECTORS_MISSING);

        let all_found = vec![out.outcomes[0].clone()];
        assert_eq!(exit_code_for_probe(&all_found), 0);
    }

    #[test]
    fn render_error_always_returns_fatal_exit_code() {
        let code = render_error(
            ProbeError::Config("boom".to_string()),
            OutputFormat::Json,
            None,
        );
        assert_eq!(code, EXIT_FATAL);
    }

    #[test]
    fn format_pretty_includes_banners_sources_and_summary() {
        let report = ProbeReport::Probe(sample_output());
        let pretty = format_pretty(&report, false);
        assert!(pretty.contains("PROBING: https://example.com/careers (mode: frame)"));
        assert!(pretty.contains("FOUND in frame"));
        assert!(pretty.contains("NOT FOUND (last tried: main-document)"));
        assert!(pretty.contains("Error: timed out after 5s"));
        assert!(pretty.contains("SUMMARY: 1/2 selectors found"));
    }

    #[test]
    fn format_pretty_handles_errors() {
        let err = ProbeError::Config("bad input".to_string());
        let payload = err.to_payload();
        let report = ProbeReport::Error(ErrorOutput {
            version: PROBE_OUTPUT_VERSION.to_string(),
            message: Some("bad input".to_string()),
            error: payload,
        });
        let pretty = format_pretty(&report, false);
        assert!(pretty.contains("[ERROR] bad input"));
        assert!(pretty.contains("Hint:"));
    }

    #[test]
    fn text_preview_truncates_at_500_chars_with_ellipsis() {
        let long = "x".repeat(600);
        let preview = truncate_preview(&long, TEXT_PREVIEW_LIMIT);
        assert_eq!(preview.chars().count(), 503);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn html_preview_truncates_at_300_chars_with_ellipsis() {
        let long = "y".repeat(301);
        let preview = truncate_preview(&long, HTML_PREVIEW_LIMIT);
        assert_eq!(preview.chars().count(), 303);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn short_previews_are_left_untouched() {
        assert_eq!(truncate_preview("short", TEXT_PREVIEW_LIMIT), "short");
    }

    #[test]
    fn preview_truncation_respects_multibyte_content() {
        let long = "é".repeat(510);
        let preview = truncate_preview(&long, TEXT_PREVIEW_LIMIT);
        assert_eq!(preview.chars().count(), 503);
    }
}
