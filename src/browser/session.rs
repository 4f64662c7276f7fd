use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::dom::Document;
use super::driver::{BrowserDriver, SelectOption};
use crate::forms::error::FormError;

/// Request sent to the browser helper over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Snapshot {
        cmd: &'static str,
        exclude_iframes: bool,
    },
    Query {
        cmd: &'static str,
        xpath: String,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn snapshot(exclude_iframes: bool) -> Self {
        BrowserRequest::Snapshot {
            cmd: "snapshot",
            exclude_iframes,
        }
    }

    pub fn query_visible(xpath: &str) -> Self {
        BrowserRequest::Query {
            cmd: "query_visible",
            xpath: xpath.to_string(),
        }
    }

    pub fn query_selected(xpath: &str) -> Self {
        BrowserRequest::Query {
            cmd: "query_selected",
            xpath: xpath.to_string(),
        }
    }

    pub fn list_options(xpath: &str) -> Self {
        BrowserRequest::Query {
            cmd: "list_options",
            xpath: xpath.to_string(),
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response received from the browser helper over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub selected: Option<bool>,
    #[serde(default)]
    pub options: Option<Vec<SelectOption>>,
}

/// A persistent browser session backed by a Node.js helper script.
///
/// The helper keeps a Chromium page open. Commands are sent as NDJSON over
/// stdin, responses read from stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    script: String,
    closed: bool,
}

impl BrowserSession {
    /// Spawn the helper script and wait for its ready signal.
    pub fn launch(script: &str) -> Result<Self, FormError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FormError::SubprocessSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            FormError::SessionIO(format!("Failed to capture stdin of {}", script))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            FormError::SessionIO(format!("Failed to capture stdout of {}", script))
        })?;

        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| FormError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        if line.trim().is_empty() {
            return Err(exit_error(&mut child, script));
        }

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| FormError::JsonParse {
                context: format!("{} ready signal", script),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(FormError::SessionProtocol {
                command: "launch".into(),
                error: format!("Did not receive ready signal from {}", script),
            });
        }

        debug!("Browser session ready ({})", script);
        Ok(BrowserSession {
            child,
            stdin,
            reader,
            script: script.to_string(),
            closed: false,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, FormError> {
        let json = serde_json::to_string(request).map_err(|e| FormError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            FormError::SessionIO(format!("Failed to write to {} stdin: {}", self.script, e))
        })?;

        self.stdin.flush().map_err(|e| {
            FormError::SessionIO(format!("Failed to flush {} stdin: {}", self.script, e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            FormError::SessionIO(format!("Failed to read from {} stdout: {}", self.script, e))
        })?;

        if line.trim().is_empty() {
            return Err(FormError::SessionIO(format!(
                "Empty response from {} (process may have died)",
                self.script
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| FormError::JsonParse {
            context: format!("{} response", self.script),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &BrowserRequest, command_name: &str) -> Result<BrowserResponse, FormError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(FormError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Query a control; any failure means the live control is unavailable.
    fn query(&mut self, request: &BrowserRequest, command_name: &str, xpath: &str) -> Result<BrowserResponse, FormError> {
        self.send_ok(request, command_name)
            .map_err(|e| FormError::LiveControlUnavailable {
                locator: xpath.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn navigate(&mut self, url: &str) -> Result<(), FormError> {
        self.send_ok(&BrowserRequest::navigate(url), "navigate")?;
        Ok(())
    }

    /// Quit the browser session.
    pub fn quit(&mut self) -> Result<(), FormError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Best-effort: the process may already be gone
        let _ = self.send(&BrowserRequest::quit());
        let _ = self.child.wait();
        Ok(())
    }
}

/// Build the error for a helper that exited before saying anything.
fn exit_error(child: &mut Child, script: &str) -> FormError {
    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        let _ = pipe.read_to_string(&mut stderr);
    }
    match child.wait() {
        Ok(status) => FormError::SubprocessFailed {
            script: script.to_string(),
            status,
            stderr: stderr.trim().to_string(),
        },
        Err(e) => FormError::SessionIO(format!("{} produced no ready signal: {}", script, e)),
    }
}

impl BrowserDriver for BrowserSession {
    fn current_document(&mut self, exclude_iframes: bool) -> Result<Document, FormError> {
        let response = self
            .send_ok(&BrowserRequest::snapshot(exclude_iframes), "snapshot")
            .map_err(|e| FormError::DocumentUnavailable(e.to_string()))?;
        let data = response
            .data
            .ok_or_else(|| FormError::DocumentUnavailable("No data in snapshot response".into()))?;
        Document::from_json(data, exclude_iframes)
    }

    fn is_visible(&mut self, locator: &str) -> Result<bool, FormError> {
        let response = self.query(&BrowserRequest::query_visible(locator), "query_visible", locator)?;
        Ok(response.visible.unwrap_or(false))
    }

    fn is_selected(&mut self, locator: &str) -> Result<bool, FormError> {
        let response = self.query(&BrowserRequest::query_selected(locator), "query_selected", locator)?;
        Ok(response.selected.unwrap_or(false))
    }

    fn list_options(&mut self, locator: &str) -> Result<Vec<SelectOption>, FormError> {
        let response = self.query(&BrowserRequest::list_options(locator), "list_options", locator)?;
        Ok(response.options.unwrap_or_default())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!("Failed to close browser session: {}", e);
        }
    }
}
