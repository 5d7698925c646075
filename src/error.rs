//! Error types for wrapper code synthesis
//!
//! Errors never escape an assembly call: the script assembler logs them and
//! substitutes an empty fragment. They are still typed so that callers of the
//! lower-level builders (and the wasm surface) can tell what went wrong:
//! - Error classification by code group
//! - User-friendly messages
//! - Conversion into `JsValue` for JavaScript callers

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, WrapError>;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Lookup errors (1xx)
    UnknownWrapper = 100,
    InvalidInvocation = 101,

    // Specification errors (2xx)
    InvalidIdentifier = 200,
    InvalidObjectPath = 201,
    MissingField = 202,

    // Configuration errors (8xx)
    ConfigError = 800,
    SerializationError = 801,
}

/// Main error type for wrapper compilation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WrapError {
    // ===== Lookup Errors =====
    #[error("Unknown wrapper: {0}")]
    UnknownWrapper(String),

    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    // ===== Specification Errors =====
    #[error("Invalid identifier in {field}: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("Invalid object path in {field}: {value:?}")]
    InvalidObjectPath { field: &'static str, value: String },

    #[error("Wrapper {wrapper} is missing {field}")]
    MissingField { wrapper: String, field: &'static str },

    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl WrapError {
    /// Get the error code for programmatic handling
    pub fn code(&self) -> ErrorCode {
        match self {
            WrapError::UnknownWrapper(_) => ErrorCode::UnknownWrapper,
            WrapError::InvalidInvocation(_) => ErrorCode::InvalidInvocation,
            WrapError::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            WrapError::InvalidObjectPath { .. } => ErrorCode::InvalidObjectPath,
            WrapError::MissingField { .. } => ErrorCode::MissingField,
            WrapError::Config(_) => ErrorCode::ConfigError,
            WrapError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Whether the error comes from a malformed wrapper specification
    /// rather than from the way the assembler was called.
    pub fn is_spec_error(&self) -> bool {
        matches!(
            self,
            WrapError::InvalidIdentifier { .. }
                | WrapError::InvalidObjectPath { .. }
                | WrapError::MissingField { .. }
        )
    }

    /// Get a user-friendly message for display
    pub fn user_message(&self) -> String {
        match self {
            WrapError::UnknownWrapper(kind) => {
                format!("No wrapper named \"{}\" is registered.", kind)
            }
            WrapError::InvalidInvocation(_) => {
                "A wrapper invocation must be an array starting with the wrapper name.".into()
            }
            WrapError::InvalidIdentifier { field, .. } => {
                format!("The {} field must be a plain JavaScript identifier.", field)
            }
            WrapError::InvalidObjectPath { field, .. } => {
                format!("The {} field must be a dotted path of identifiers.", field)
            }
            WrapError::MissingField { wrapper, field } => {
                format!("The wrapper {} needs a {} field.", wrapper, field)
            }
            WrapError::Config(_) => "Invalid assembler options. Please check your settings.".into(),
            WrapError::Serialization(_) => {
                "Failed to read wrapper data. Please check your input.".into()
            }
        }
    }
}

impl From<serde_json::Error> for WrapError {
    fn from(err: serde_json::Error) -> Self {
        WrapError::Serialization(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for WrapError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        WrapError::Serialization(err.to_string())
    }
}

impl From<WrapError> for JsValue {
    fn from(err: WrapError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Error information for JavaScript consumption
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: u32,
    pub message: String,
    pub user_message: String,
    pub is_spec_error: bool,
}

impl From<&WrapError> for ErrorInfo {
    fn from(err: &WrapError) -> Self {
        ErrorInfo {
            code: err.code() as u32,
            message: err.to_string(),
            user_message: err.user_message(),
            is_spec_error: err.is_spec_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_errors() {
        assert!(WrapError::InvalidIdentifier {
            field: "wrapped_name",
            value: "a b".into()
        }
        .is_spec_error());
        assert!(WrapError::MissingField {
            wrapper: "navigator.webdriver".into(),
            field: "parent_object_property"
        }
        .is_spec_error());

        assert!(!WrapError::UnknownWrapper("x".into()).is_spec_error());
        assert!(!WrapError::Config("x".into()).is_spec_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            WrapError::UnknownWrapper("x".into()).code(),
            ErrorCode::UnknownWrapper
        );
        assert_eq!(
            WrapError::InvalidObjectPath {
                field: "parent_object",
                value: "a..b".into()
            }
            .code(),
            ErrorCode::InvalidObjectPath
        );
        assert_eq!(
            WrapError::Serialization("x".into()).code() as u32,
            801
        );
    }

    #[test]
    fn test_error_info() {
        let err = WrapError::UnknownWrapper("Navigator.prototype.plugins".into());
        let info = ErrorInfo::from(&err);
        assert_eq!(info.code, 100);
        assert!(info.message.contains("Navigator.prototype.plugins"));
        assert!(info.user_message.contains("Navigator.prototype.plugins"));
        assert!(!info.is_spec_error);
    }
}
