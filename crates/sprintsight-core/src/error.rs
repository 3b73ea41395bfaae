//! Core error types for sprintsight-core.
//!
//! This module defines the error hierarchy used across the library,
//! one enum per concern, wired together with thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sprintsight-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Issue-source errors (tracker API, payload decoding)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Report-writing errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No platform configuration directory available
    #[error("No configuration directory available on this platform")]
    NoConfigDir,

    /// A status name appears in more than one classification set
    #[error("Status '{status}' appears in both the '{first}' and '{second}' sets")]
    OverlappingStatuses {
        status: String,
        first: &'static str,
        second: &'static str,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by issue/board sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP transport failure
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Tracker API returned a non-success status
    #[error("Tracker API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Base URL could not be parsed
    #[error("Invalid tracker base URL: {url}")]
    InvalidBaseUrl { url: String },

    /// Timestamp field could not be parsed
    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    /// Date field could not be parsed
    #[error("Invalid date: {value}")]
    InvalidDate { value: String },

    /// A required field was missing from the payload
    #[error("Missing field in tracker payload: {field}")]
    MissingField { field: &'static str },

    /// Board lookup failed
    #[error("Board {board_id} not found")]
    BoardNotFound { board_id: u64 },

    /// Board has no active sprint
    #[error("Board {board_id} has no active sprint")]
    NoActiveSprint { board_id: u64 },
}

/// Report-writing errors.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Requested output column does not exist in the registry
    #[error("Unknown report column: {0}")]
    UnknownColumn(String),

    /// CSV encoding/decoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
