//! Argument narrowing for tool calls.
//!
//! The raw argument bag of a call is deserialized into the tool's typed
//! record and then run through that record's guards. Either step failing
//! yields a [`ValidationError`]; nothing reaches the remote service.
//!
//! ```rust,ignore
//! let params: GetDataParams = parse_arguments(ToolName::GetData, request.arguments)?;
//! ```

pub mod input_guards;

pub use input_guards::{
    MAX_SHEET_ID, ValidationError, ValidationResult, validate_grid, validate_non_empty_string,
    validate_numeric_range, validate_sheet_id,
};

use crate::tools::{ToolName, ToolParams};
use rmcp::model::JsonObject;
use serde_json::Value;

/// Deserializes and guards the arguments of one call.
pub fn parse_arguments<P: ToolParams>(
    tool: ToolName,
    arguments: Option<JsonObject>,
) -> ValidationResult<P> {
    let value = Value::Object(arguments.unwrap_or_default());
    let params: P = serde_json::from_value(value).map_err(|e| ValidationError::Malformed {
        tool: tool.to_string(),
        reason: e.to_string(),
    })?;
    params.validate()?;
    Ok(params)
}
