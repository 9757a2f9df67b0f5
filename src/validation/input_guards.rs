//! Input guards for tool arguments.
//!
//! Each guard checks one property of an already-typed argument and returns
//! it unchanged on success, so guards compose with `?` inside
//! `ToolParams::validate`.

use thiserror::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Raised when a tool call is not well formed, before any remote call.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Arguments did not deserialize into the tool's record
    #[error("invalid arguments for tool '{tool}': {reason}")]
    Malformed { tool: String, reason: String },

    /// String parameter is empty or contains only whitespace
    #[error("parameter '{parameter}' cannot be empty or whitespace-only")]
    EmptyString { parameter: String },

    /// Numeric parameter is outside valid range
    #[error("parameter '{parameter}' value {value} is outside valid range [{min}, {max}]")]
    NumericOutOfRange {
        parameter: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Grid parameter has no rows
    #[error("parameter '{parameter}' must contain at least one row")]
    EmptyGrid { parameter: String },
}

/// Sheet ids are 32-bit on the remote side.
pub const MAX_SHEET_ID: i64 = i32::MAX as i64;

/// Validates that a string parameter is not empty or whitespace-only
///
/// ```
/// use sheets_wizard::validation::validate_non_empty_string;
///
/// assert!(validate_non_empty_string("range", "Sheet1!A1:B2").is_ok());
/// assert!(validate_non_empty_string("range", "  ").is_err());
/// ```
pub fn validate_non_empty_string<'a>(
    parameter_name: &str,
    value: &'a str,
) -> ValidationResult<&'a str> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyString {
            parameter: parameter_name.to_string(),
        })
    } else {
        Ok(value)
    }
}

/// Validates that a numeric parameter is within a specified range (inclusive)
pub fn validate_numeric_range<T>(
    parameter_name: &str,
    value: T,
    min: T,
    max: T,
) -> ValidationResult<T>
where
    T: PartialOrd + Copy + Into<i64>,
{
    if value < min || value > max {
        Err(ValidationError::NumericOutOfRange {
            parameter: parameter_name.to_string(),
            value: value.into(),
            min: min.into(),
            max: max.into(),
        })
    } else {
        Ok(value)
    }
}

pub fn validate_sheet_id(parameter_name: &str, value: i64) -> ValidationResult<i64> {
    validate_numeric_range(parameter_name, value, 0, MAX_SHEET_ID)
}

/// Validates that a 2D grid has at least one row. Ragged rows are allowed;
/// the remote side pads them.
pub fn validate_grid<'a, T>(parameter_name: &str, rows: &'a [Vec<T>]) -> ValidationResult<&'a [Vec<T>]> {
    if rows.is_empty() {
        Err(ValidationError::EmptyGrid {
            parameter: parameter_name.to_string(),
        })
    } else {
        Ok(rows)
    }
}
