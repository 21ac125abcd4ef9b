// src/error.rs

//! Unified error handling for the relay.

use std::fmt;

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Portal login did not show the success marker
    #[error("Login failed: {0}")]
    Auth(String),

    /// No download link matched the configured table name
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-200 response from the portal
    #[error("Bad status code while {context}, expected 200 but got {status}")]
    Transport { context: String, status: u16 },

    /// 200 response without a body
    #[error("Empty body received while {context}")]
    EmptyBody { context: String },

    /// Document text could not be extracted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Chat platform request failed
    #[error("Channel error during {operation}: {message}")]
    Channel { operation: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a login error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a transport error for an unexpected status code.
    pub fn transport(context: impl Into<String>, status: u16) -> Self {
        Self::Transport {
            context: context.into(),
            status,
        }
    }

    /// Create an empty-body error.
    pub fn empty_body(context: impl Into<String>) -> Self {
        Self::EmptyBody {
            context: context.into(),
        }
    }

    /// Create a document parse error.
    pub fn parse(message: impl fmt::Display) -> Self {
        Self::Parse(message.to_string())
    }

    /// Create a chat platform error with the failed operation.
    pub fn channel(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Channel {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_names_context_and_status() {
        let err = AppError::transport("downloading table", 503);
        assert_eq!(
            err.to_string(),
            "Bad status code while downloading table, expected 200 but got 503"
        );
    }

    #[test]
    fn empty_body_error_names_context() {
        let err = AppError::empty_body("logging into moodle");
        assert_eq!(err.to_string(), "Empty body received while logging into moodle");
    }
}
