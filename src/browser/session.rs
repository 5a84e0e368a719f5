//! One browser session: a spawned helper process plus the line protocol
//! that drives it.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::helper::{
    ensure_node_available, ensure_playwright_available, map_spawn_error, HelperCommand,
    HelperReply, HELPER_SCRIPT,
};
use crate::config::Config;
use crate::driver::{FrameResolution, PageDriver};
use crate::error::{DriverError, ProbeError, Result};
use crate::types::{
    ElementContent, FrameHandle, LoadState, NavigationStatus, QueryTarget,
};

/// Slack added on top of each command's own timeout before the helper is
/// declared wedged.
pub const DEFAULT_COMMAND_GRACE: Duration = Duration::from_secs(10);

/// How long `close` waits for the helper to exit before killing it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Configuration for launching a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// The Node.js command to use (default: "node").
    pub node_command: String,
    /// Whether to run the browser headless.
    pub headless: bool,
    /// Extra slack per command beyond its declared timeout.
    pub command_grace: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            headless: true,
            command_grace: DEFAULT_COMMAND_GRACE,
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            node_command: config.node_command.clone(),
            headless: config.headless,
            ..Self::default()
        }
    }
}

struct HelperIo {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// A live page behind the helper process. Exclusively owned by one run; the
/// protocol is strictly request/reply, serialized by the io lock.
pub struct BrowserSession {
    io: Mutex<HelperIo>,
    options: SessionOptions,
}

impl BrowserSession {
    /// Preflights Node/Playwright and spawns the helper. The child is
    /// spawned with kill-on-drop so the browser is released even when the
    /// run unwinds without reaching `close`.
    pub async fn launch(options: SessionOptions) -> Result<Self> {
        ensure_node_available(&options.node_command).await?;
        ensure_playwright_available(&options.node_command).await?;

        let mut cmd = Command::new(&options.node_command);
        cmd.arg("-e")
            .arg(HELPER_SCRIPT)
            .arg(if options.headless { "1" } else { "0" })
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|err| map_spawn_error(err, &options.node_command))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProbeError::Driver("helper stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| ProbeError::Driver("helper stdout unavailable".to_string()))?;

        debug!(node = %options.node_command, headless = options.headless, "browser helper spawned");
        Ok(Self {
            io: Mutex::new(HelperIo {
                child,
                stdin,
                stdout,
            }),
            options,
        })
    }

    /// Sends one command and reads one reply, bounded by the command's own
    /// timeout plus the configured grace.
    async fn send(
        &self,
        command: &HelperCommand<'_>,
        op_timeout: Duration,
    ) -> std::result::Result<HelperReply, DriverError> {
        let line = serde_json::to_string(command)
            .map_err(|e| DriverError::Internal(format!("command encoding failed: {e}")))?;

        let mut io = self.io.lock().await;
        io.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| DriverError::Internal(format!("helper write failed: {e}")))?;
        io.stdin
            .write_all(b"\n")
            .await
            .map_err(|e| DriverError::Internal(format!("helper write failed: {e}")))?;
        io.stdin
            .flush()
            .await
            .map_err(|e| DriverError::Internal(format!("helper write failed: {e}")))?;

        let bound = op_timeout + self.options.command_grace;
        let mut reply_line = String::new();
        match timeout(bound, io.stdout.read_line(&mut reply_line)).await {
            Err(_) => Err(DriverError::Timeout(bound)),
            Ok(Err(e)) => Err(DriverError::Internal(format!("helper read failed: {e}"))),
            Ok(Ok(0)) => Err(DriverError::Internal(
                "helper exited unexpectedly".to_string(),
            )),
            Ok(Ok(_)) => serde_json::from_str(&reply_line)
                .map_err(|e| DriverError::Internal(format!("malformed helper reply: {e}"))),
        }
    }

    fn frame_id<'a>(target: QueryTarget<'a>) -> Option<&'a str> {
        match target {
            QueryTarget::Document => None,
            QueryTarget::Frame(handle) => Some(handle.id()),
        }
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn navigate(
        &self,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<NavigationStatus, DriverError> {
        let reply = self
            .send(
                &HelperCommand::Goto {
                    url,
                    timeout_ms: timeout.as_millis() as u64,
                },
                timeout,
            )
            .await?;
        if !reply.is_ok() {
            return Err(reply.to_driver_error("", timeout));
        }
        match reply.navigation.as_deref() {
            Some("timed-out") => Ok(NavigationStatus::TimedOut),
            _ => Ok(NavigationStatus::Complete),
        }
    }

    async fn wait_for_load_state(
        &self,
        target: QueryTarget<'_>,
        state: LoadState,
        timeout: Duration,
    ) -> std::result::Result<(), DriverError> {
        let reply = self
            .send(
                &HelperCommand::WaitLoad {
                    frame_id: Self::frame_id(target),
                    state,
                    timeout_ms: timeout.as_millis() as u64,
                },
                timeout,
            )
            .await?;
        if reply.is_ok() {
            Ok(())
        } else {
            Err(reply.to_driver_error("", timeout))
        }
    }

    async fn wait_for_selector(
        &self,
        target: QueryTarget<'_>,
        selector: &str,
        timeout: Duration,
    ) -> std::result::Result<ElementContent, DriverError> {
        let reply = self
            .send(
                &HelperCommand::Query {
                    frame_id: Self::frame_id(target),
                    selector,
                    timeout_ms: timeout.as_millis() as u64,
                },
                timeout,
            )
            .await?;
        if !reply.is_ok() {
            return Err(reply.to_driver_error(selector, timeout));
        }
        match (reply.text, reply.html) {
            (Some(text), Some(html)) => Ok(ElementContent { text, html }),
            _ => Err(DriverError::Internal(
                "helper reply missing element content".to_string(),
            )),
        }
    }

    async fn resolve_frame(
        &self,
        container_selector: &str,
        timeout: Duration,
    ) -> std::result::Result<FrameResolution, DriverError> {
        let reply = self
            .send(
                &HelperCommand::Frame {
                    selector: container_selector,
                    timeout_ms: timeout.as_millis() as u64,
                },
                timeout,
            )
            .await?;
        if !reply.is_ok() {
            return Err(reply.to_driver_error(container_selector, timeout));
        }
        match (reply.frame.as_deref(), reply.frame_id) {
            (Some("resolved"), Some(id)) => Ok(FrameResolution::Frame(FrameHandle::new(id))),
            (Some("container-without-frame"), _) => Ok(FrameResolution::ContainerWithoutFrame),
            (Some("no-container"), _) => Ok(FrameResolution::NoContainer),
            _ => Err(DriverError::Internal(
                "helper reply missing frame resolution".to_string(),
            )),
        }
    }

    async fn probe_readiness(
        &self,
        markers: &[String],
        min_body_text: usize,
        timeout: Duration,
    ) -> std::result::Result<bool, DriverError> {
        let reply = self
            .send(
                &HelperCommand::Probe {
                    markers,
                    min_text_len: min_body_text,
                    timeout_ms: timeout.as_millis() as u64,
                },
                timeout,
            )
            .await?;
        if !reply.is_ok() {
            return Err(reply.to_driver_error("", timeout));
        }
        Ok(reply.ready.unwrap_or(false))
    }

    async fn close(&self) {
        if let Err(err) = self.send(&HelperCommand::Close, SHUTDOWN_GRACE).await {
            warn!(%err, "helper did not acknowledge close");
        }
        let mut io = self.io.lock().await;
        if timeout(SHUTDOWN_GRACE, io.child.wait()).await.is_err() {
            warn!("helper did not exit; killing");
            let _ = io.child.kill().await;
        }
    }
}
