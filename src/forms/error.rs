use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    /// Form configuration source could not be read
    #[error("Could not read form configuration '{path}': {source}")]
    ConfigurationUnavailable { path: String, source: std::io::Error },

    /// Form configuration was readable but malformed
    #[error("Malformed form configuration ({context}): {message}")]
    ConfigurationFormat { context: String, message: String },

    /// Live document snapshot could not be taken
    #[error("Could not snapshot the live document: {0}")]
    DocumentUnavailable(String),

    /// Control not present in the document snapshot
    #[error("Element '{element}' not found: {context}")]
    ElementNotFound { element: String, context: String },

    /// Live control exists in the snapshot but cannot be queried in the browser
    #[error("Live control '{locator}' unavailable: {reason}")]
    LiveControlUnavailable { locator: String, reason: String },

    /// Node.js helper failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn { script: String, source: std::io::Error },

    /// Node.js helper exited with non-zero status
    #[error("{script} exited with {status}: {stderr}")]
    SubprocessFailed { script: String, status: ExitStatus, stderr: String },

    /// Pipe-level failure talking to the browser session
    #[error("Browser session I/O: {0}")]
    SessionIO(String),

    /// Browser session answered a command with ok=false or an unexpected shape
    #[error("Browser session command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse { context: String, source: serde_json::Error },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize { context: String, source: serde_json::Error },
}
