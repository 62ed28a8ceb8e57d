//! Error types for Supaplay.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for Supaplay operations.
#[derive(Error, Debug)]
pub enum PlayError {
    /// Submission rejected before a run could start (missing URL, key, or
    /// expression, or a run already in flight).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Expression errors (tokenizer, parser, or an unknown builder method).
    #[error("Expression error: {0}")]
    Expression(String),

    /// API transport errors (host unreachable, TLS failure, timeout).
    #[error("API error: {0}")]
    Api(String),

    /// Configuration errors (invalid config file, bad deep link, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlayError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates an expression error with the given message.
    pub fn expression(msg: impl Into<String>) -> Self {
        Self::Expression(msg.into())
    }

    /// Creates an API error with the given message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Expression(_) => "Expression Error",
            Self::Api(_) => "API Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using PlayError.
pub type Result<T> = std::result::Result<T, PlayError>;
