//! Unified error types for srt-alert
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the stats feed
    #[error("Stats source error: {0}")]
    Source(#[from] SourceError),

    /// Error from the overlay sink
    #[error("Alert sink error: {0}")]
    Sink(#[from] SinkError),

    /// Error from the OBS websocket client
    #[error("OBS error: {0}")]
    Obs(#[from] ObsError),

    /// Failed to install the shutdown handler
    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// No config file given and none found in the default locations
    #[error("No configuration file found (searched: {0})")]
    NoConfigFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required config field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Refusing to overwrite an existing file
    #[error("Configuration file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ConfigError {
    /// Shorthand for an invalid field value
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Name of the offending field, if the error concerns one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { key, .. } => Some(key),
            Self::MissingField(key) => Some(key),
            _ => None,
        }
    }
}

/// Errors from fetching stream statistics
///
/// These never reach the alert engine. The stats source maps every one of
/// them to a disconnected sample.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport-level HTTP failure (refused, timeout, DNS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Stats server returned status {0}")]
    Status(u16),

    /// Body was not the expected stats document
    #[error("Malformed stats response: {0}")]
    Malformed(String),
}

/// Errors from the OBS websocket client
#[derive(Error, Debug)]
pub enum ObsError {
    /// Websocket transport failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tungstenite::Error>),

    /// Connection closed by OBS
    #[error("Connection closed by OBS")]
    Closed,

    /// Handshake did not follow the expected Hello/Identify/Identified sequence
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// OBS rejected the password
    #[error("Authentication failed")]
    AuthFailed,

    /// A request returned a failure status
    #[error("Request {request} failed (code {code}): {comment}")]
    RequestFailed {
        request: String,
        code: u16,
        comment: String,
    },

    /// Overlay source is not part of the scene
    #[error("Source '{source_name}' not found in scene '{scene}'")]
    SourceNotFound { scene: String, source_name: String },

    /// Message could not be encoded or decoded
    #[error("Malformed message: {0}")]
    Protocol(#[from] serde_json::Error),
}

impl From<tungstenite::Error> for ObsError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                ObsError::Closed
            }
            other => ObsError::WebSocket(Box::new(other)),
        }
    }
}

/// Errors from applying a visibility decision
#[derive(Error, Debug)]
pub enum SinkError {
    /// OBS operation failed
    #[error("OBS operation failed: {0}")]
    Obs(#[from] ObsError),

    /// Still waiting out the reconnect backoff
    #[error("OBS unavailable, next reconnect attempt in {0:?}")]
    Backoff(std::time::Duration),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
