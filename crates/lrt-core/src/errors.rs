//! Error types for the depositor

use thiserror::Error;

/// Node connection and query errors
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Node unreachable at {url}")]
    Unreachable { url: String },

    #[error("Node returned error: {message}")]
    ApiError { message: String },

    #[error("Node request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The EVM reverted the call. `data` holds the raw revert payload when the node returned one.
    #[error("Execution reverted: {message}")]
    ExecutionReverted {
        message: String,
        data: Option<Vec<u8>>,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Protocol-level input errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },
}

/// Key loading and signing errors
#[derive(Debug, Error)]
pub enum TxError {
    #[error("Failed to sign transaction: {message}")]
    SigningFailed { message: String },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {field}")]
    Missing { field: &'static str },

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl NodeError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "node_unreachable",
            Self::ApiError { .. } => "node_api_error",
            Self::Timeout { .. } => "node_timeout",
            Self::ExecutionReverted { .. } => "execution_reverted",
            Self::ParseError(_) => "node_parse_error",
        }
    }

    /// No answer came back, so the request may or may not have taken effect
    pub fn is_no_response(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }
}
