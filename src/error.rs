//! Error taxonomy for tool calls.
//!
//! Handlers and the dispatcher pass [`ToolError`] around as ordinary values.
//! Only the outermost boundary turns it into envelope text with
//! [`render_outcome`]; no error ever becomes a protocol-level failure.

use crate::auth::CredentialError;
use crate::sheets::SheetsError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Prefix of every failure envelope.
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool '{0}' is disabled by server configuration")]
    ToolDisabled(String),

    #[error(transparent)]
    InvalidArguments(#[from] ValidationError),

    #[error(transparent)]
    MalformedCredentials(#[from] CredentialError),

    #[error(transparent)]
    Remote(#[from] SheetsError),

    #[error("failed to encode tool result: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ToolError {
    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::ToolDisabled(_) => "tool_disabled",
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::MalformedCredentials(_) => "malformed_credentials",
            ToolError::Remote(SheetsError::Api { .. }) => "remote_rejected",
            ToolError::Remote(_) => "remote_failure",
            ToolError::Encode(_) => "encode",
        }
    }

    /// Whether the caller can fix the call without anything changing
    /// remotely.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownTool(_)
                | ToolError::ToolDisabled(_)
                | ToolError::InvalidArguments(_)
                | ToolError::MalformedCredentials(_)
        )
    }
}

/// Text of the single content block returned for a call.
pub fn render_outcome(outcome: &Result<String, ToolError>) -> String {
    match outcome {
        Ok(body) => body.clone(),
        Err(error) => format!("{ERROR_PREFIX}{error}"),
    }
}
