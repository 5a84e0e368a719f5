//! The embedded Node Playwright helper: the inline script, its wire types,
//! error mapping, and availability checks for Node.js and Playwright.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{DriverError, ProbeError, Result};
use crate::types::LoadState;

/// Long-lived helper. Reads one JSON command per stdin line, answers with one
/// JSON reply per stdout line, and keeps the browser open until a `close`
/// command (or stdin EOF). The headless flag is the single script argument.
pub(crate) const HELPER_SCRIPT: &str = r#"
const readline = require('readline');

async function main() {
  const { chromium } = require('playwright');
  const headless = process.argv[1] !== '0';
  const browser = await chromium.launch({ headless });
  const page = await browser.newPage();
  const frames = new Map();
  let nextFrameId = 1;

  const targetOf = (cmd) => {
    if (cmd.frameId) {
      const frame = frames.get(cmd.frameId);
      if (!frame) {
        const err = new Error(`unknown frame id ${cmd.frameId}`);
        err.kind = 'internal';
        throw err;
      }
      return frame;
    }
    return page;
  };

  const handle = async (cmd) => {
    switch (cmd.op) {
      case 'goto': {
        try {
          await page.goto(cmd.url, { waitUntil: 'commit', timeout: cmd.timeoutMs });
          return { status: 'ok', navigation: 'complete' };
        } catch (err) {
          if (err && err.name === 'TimeoutError') {
            return { status: 'ok', navigation: 'timed-out' };
          }
          const message = err && err.message ? err.message : String(err);
          return { status: 'error', kind: 'navigation', message };
        }
      }
      case 'wait-load': {
        const state = cmd.state === 'dom-content-loaded' ? 'domcontentloaded' : 'networkidle';
        await targetOf(cmd).waitForLoadState(state, { timeout: cmd.timeoutMs });
        return { status: 'ok' };
      }
      case 'query': {
        const element = await targetOf(cmd).waitForSelector(cmd.selector, { timeout: cmd.timeoutMs });
        if (!element) {
          return { status: 'error', kind: 'not-found', message: `no element matched ${cmd.selector}` };
        }
        const text = await element.innerText();
        const html = await element.innerHTML();
        return { status: 'ok', text, html };
      }
      case 'frame': {
        let container;
        try {
          container = await page.waitForSelector(cmd.selector, { timeout: cmd.timeoutMs });
        } catch (err) {
          if (err && err.name === 'TimeoutError') {
            return { status: 'ok', frame: 'no-container' };
          }
          throw err;
        }
        if (!container) {
          return { status: 'ok', frame: 'no-container' };
        }
        const frame = await container.contentFrame();
        if (!frame) {
          return { status: 'ok', frame: 'container-without-frame' };
        }
        const id = `frame-${nextFrameId++}`;
        frames.set(id, frame);
        return { status: 'ok', frame: 'resolved', frameId: id };
      }
      case 'probe': {
        try {
          await page.waitForFunction(
            ({ markers, minTextLen }) => {
              for (const marker of markers) {
                if (document.querySelector(marker)) return true;
              }
              const body = document.body ? document.body.innerText : '';
              return body.trim().length >= minTextLen;
            },
            { markers: cmd.markers, minTextLen: cmd.minTextLen },
            { timeout: cmd.timeoutMs }
          );
          return { status: 'ok', ready: true };
        } catch (err) {
          if (err && err.name === 'TimeoutError') {
            return { status: 'ok', ready: false };
          }
          throw err;
        }
      }
      case 'close': {
        await browser.close();
        return { status: 'ok', done: true };
      }
      default:
        return { status: 'error', kind: 'internal', message: `unknown op ${cmd.op}` };
    }
  };

  const rl = readline.createInterface({ input: process.stdin, terminal: false });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let reply;
    try {
      reply = await handle(JSON.parse(line));
    } catch (err) {
      const message = err && err.message ? err.message : String(err);
      const kind = err && err.name === 'TimeoutError' ? 'timeout' : (err && err.kind) || 'internal';
      reply = { status: 'error', kind, message };
    }
    process.stdout.write(JSON.stringify(reply) + '\n');
    if (reply.done) break;
  }
  await browser.close();
  process.exit(0);
}

main().catch((err) => {
  const message = err && err.message ? err.message : String(err);
  process.stderr.write(JSON.stringify({ status: 'error', kind: 'internal', message }) + '\n');
  process.exit(1);
});
"#;

/// Timeout for checking node/playwright availability.
pub(crate) const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Script to check if Playwright is installed.
const PLAYWRIGHT_CHECK_SCRIPT: &str = "require('playwright'); process.stdout.write('ok');";

/// One command on the helper's stdin.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub(crate) enum HelperCommand<'a> {
    #[serde(rename_all = "camelCase")]
    Goto { url: &'a str, timeout_ms: u64 },
    #[serde(rename_all = "camelCase")]
    WaitLoad {
        #[serde(skip_serializing_if = "Option::is_none")]
        frame_id: Option<&'a str>,
        state: LoadState,
        timeout_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Query {
        #[serde(skip_serializing_if = "Option::is_none")]
        frame_id: Option<&'a str>,
        selector: &'a str,
        timeout_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Frame { selector: &'a str, timeout_ms: u64 },
    #[serde(rename_all = "camelCase")]
    Probe {
        markers: &'a [String],
        min_text_len: usize,
        timeout_ms: u64,
    },
    Close,
}

/// One reply line from the helper.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HelperReply {
    pub status: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub navigation: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub frame: Option<String>,
    #[serde(default)]
    pub frame_id: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
}

impl HelperReply {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Converts an error reply into the driver taxonomy.
    pub fn to_driver_error(&self, selector: &str, waited: Duration) -> DriverError {
        let message = self.message.as_deref().unwrap_or("unknown helper error");
        match self.kind.as_deref() {
            Some("timeout") => DriverError::Timeout(waited),
            Some("not-found") => DriverError::NotFound {
                selector: selector.to_string(),
            },
            Some("navigation") => DriverError::Navigation(message.to_string()),
            _ => DriverError::Internal(message.to_string()),
        }
    }
}

/// Maps a spawn error to an appropriate ProbeError.
pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> ProbeError {
    if err.kind() == io::ErrorKind::NotFound {
        ProbeError::Config(format!(
            "Unable to spawn browser helper; '{}' was not found on PATH",
            command
        ))
    } else {
        ProbeError::Io(err)
    }
}

/// Maps helper stderr output to an appropriate ProbeError.
pub(crate) fn map_helper_error(status_text: impl Into<String>, stderr: &str) -> ProbeError {
    let lower = stderr.to_ascii_lowercase();

    if lower.contains("cannot find module 'playwright'") {
        return ProbeError::Config(
            "Playwright npm package is missing; install with `npm install playwright`.".to_string(),
        );
    }

    if lower.contains("timeout") {
        return ProbeError::Config(
            "Browser helper timed out; try increasing --nav-timeout or --selector-timeout, and ensure the page finishes loading."
                .to_string(),
        );
    }

    ProbeError::Driver(format!(
        "Browser helper exited with status {}: {}",
        status_text.into(),
        stderr.trim()
    ))
}

/// Ensures Node.js is available on the system.
pub async fn ensure_node_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let status = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.status())
        .await
        .map_err(|_| {
            ProbeError::Config(format!(
                "Timed out checking node availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !status.success() {
        return Err(ProbeError::Config(format!(
            "Node command {:?} is not available (exit {})",
            node_command, status
        )));
    }

    Ok(())
}

/// Ensures the Playwright npm package is installed.
pub async fn ensure_playwright_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(PLAYWRIGHT_CHECK_SCRIPT)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            ProbeError::Config(format!(
                "Timed out checking Playwright availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(map_helper_error(format!("{:?}", output.status), &stderr));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_helper_error_detects_missing_module() {
        let err = map_helper_error("1", "Error: Cannot find module 'playwright'");
        match err {
            ProbeError::Config(msg) => assert!(
                msg.contains("npm install playwright"),
                "expected npm install hint, got: {msg}"
            ),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn map_helper_error_includes_timeout_hint() {
        let err = map_helper_error("1", "TimeoutError: waiting for networkidle");
        let msg = err.to_string();
        assert!(
            msg.contains("--nav-timeout") || msg.contains("--selector-timeout"),
            "expected CLI hint, got: {msg}"
        );
    }

    #[test]
    fn map_helper_error_preserves_other_messages() {
        let err = map_helper_error("exit status: 1", "segfault in chromium");
        let msg = err.to_string();
        assert!(msg.contains("segfault in chromium"));
    }

    #[test]
    fn commands_serialize_to_helper_wire_format() {
        let cmd = HelperCommand::Query {
            frame_id: Some("frame-1"),
            selector: "#jobs",
            timeout_ms: 5000,
        };
        let json = serde_json::to_string(&cmd).expect("serialize command");
        assert_eq!(
            json,
            r##"{"op":"query","frameId":"frame-1","selector":"#jobs","timeoutMs":5000}"##
        );

        let cmd = HelperCommand::WaitLoad {
            frame_id: None,
            state: LoadState::DomContentLoaded,
            timeout_ms: 10000,
        };
        let json = serde_json::to_string(&cmd).expect("serialize command");
        assert!(json.contains("\"op\":\"wait-load\""));
        assert!(json.contains("\"state\":\"dom-content-loaded\""));
        assert!(!json.contains("frameId"));

        let json = serde_json::to_string(&HelperCommand::Close).expect("serialize close");
        assert_eq!(json, r#"{"op":"close"}"#);
    }

    #[test]
    fn error_reply_maps_onto_driver_taxonomy() {
        let reply: HelperReply =
            serde_json::from_str(r#"{"status":"error","kind":"timeout","message":"t"}"#)
                .expect("parse reply");
        assert_eq!(
            reply.to_driver_error("#x", Duration::from_secs(5)),
            DriverError::Timeout(Duration::from_secs(5))
        );

        let reply: HelperReply =
            serde_json::from_str(r#"{"status":"error","kind":"not-found","message":"m"}"#)
                .expect("parse reply");
        assert_eq!(
            reply.to_driver_error("#x", Duration::from_secs(5)),
            DriverError::NotFound {
                selector: "#x".to_string()
            }
        );

        let reply: HelperReply =
            serde_json::from_str(r#"{"status":"error","kind":"navigation","message":"dns"}"#)
                .expect("parse reply");
        assert_eq!(
            reply.to_driver_error("", Duration::ZERO),
            DriverError::Navigation("dns".to_string())
        );

        let reply: HelperReply = serde_json::from_str(r#"{"status":"error","message":"boom"}"#)
            .expect("parse reply");
        assert_eq!(
            reply.to_driver_error("", Duration::ZERO),
            DriverError::Internal("boom".to_string())
        );
    }

    #[test]
    fn ok_reply_parses_content_fields() {
        let reply: HelperReply =
            serde_json::from_str(r#"{"status":"ok","text":"Jobs","html":"<b>Jobs</b>"}"#)
                .expect("parse reply");
        assert!(reply.is_ok());
        assert_eq!(reply.text.as_deref(), Some("Jobs"));
        assert_eq!(reply.html.as_deref(), Some("<b>Jobs</b>"));
    }

    #[tokio::test]
    async fn ensure_node_available_fails_for_missing_binary() {
        let result = ensure_node_available("definitely-not-a-binary").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ensure_playwright_available_fails_for_missing_binary() {
        let result = ensure_playwright_available("definitely-not-a-binary").await;
        assert!(result.is_err());
    }
}
