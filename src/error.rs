//! Error types for habitviz
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, invalid config)
//! - 4: Operation failed (io, network, terminal)
//!
//! The ingestion core never fails; errors only come from the outer layers
//! (configuration, retrieval, output, terminal).

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the habitviz CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for habitviz operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config file already exists: {0}")]
    ConfigExists(PathBuf),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Fetch failed for {source_name}: {message}")]
    FetchFailed { source_name: String, message: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_) | Error::InvalidArgument(_) | Error::ConfigExists(_) => {
                exit_codes::USER_ERROR
            }

            Error::Io(_)
            | Error::Http(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::FetchFailed { .. }
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::ConfigExists(path) => Some(serde_json::json!({ "path": path })),
            Error::FetchFailed { source_name, .. } => {
                Some(serde_json::json!({ "source": source_name }))
            }
            _ => None,
        }
    }
}

/// Result type alias for habitviz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_split_user_and_operation_errors() {
        assert_eq!(
            Error::InvalidConfig("x".to_string()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::ConfigExists(PathBuf::from(".habitviz.toml")).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::FetchFailed {
                source_name: "remote".to_string(),
                message: "status 401".to_string(),
            }
            .exit_code(),
            exit_codes::OPERATION_FAILED
        );
    }

    #[test]
    fn json_error_carries_details() {
        let err = Error::ConfigExists(PathBuf::from("a.toml"));
        let json = JsonError::from(&err);
        assert_eq!(json.code, 2);
        assert!(json.error.contains("a.toml"));
        assert!(json.details.is_some());
    }
}
