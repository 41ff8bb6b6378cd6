//! Error types for the statement inbox.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Inbox error: {0}")]
    Inbox(#[from] InboxError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Failures a backend host can report for a single call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    #[error("Backend unreachable for {command}: {reason}")]
    Unreachable { command: String, reason: String },

    #[error("Backend call {command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Backend rejected {command} (status {status:?}): {message}")]
    Backend {
        command: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid response for {command}: {reason}")]
    InvalidResponse { command: String, reason: String },
}

impl BridgeError {
    /// Whether the failure means "no usable backend" rather than
    /// "backend answered with an error".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }

    /// Name of the command that failed.
    pub fn command(&self) -> &str {
        match self {
            Self::Unreachable { command, .. }
            | Self::Timeout { command, .. }
            | Self::Backend { command, .. }
            | Self::InvalidResponse { command, .. } => command,
        }
    }
}

/// Errors surfaced by inbox pipeline operations.
///
/// With the default fallback policy no operation ever produces
/// `Backend`; it only appears when backend errors are surfaced.
#[derive(Debug, thiserror::Error)]
pub enum InboxError {
    #[error("Backend error during {command}: {detail}")]
    Backend { command: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
