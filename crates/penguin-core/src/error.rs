//! Error types for the Penguin chat core.

use crate::gateway::GatewayError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the chat core and its adapters.
///
/// Variants mirror the error taxonomy of the conversation state machine:
/// rejected intents (`Unauthorized`, `InvalidReply`), recoverable backend
/// failures (`Gateway`) and the storage/config errors raised by adapters.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatError {
    /// The account may not chat (pending approval and not an admin).
    #[error("Unauthorized: account is not approved to chat")]
    Unauthorized,

    /// A message referenced a reply target that is not in the conversation.
    #[error("Invalid reply target: message '{id}' is not in the conversation")]
    InvalidReply { id: String },

    /// A message id was appended twice to the same conversation.
    #[error("Duplicate message id: '{id}'")]
    DuplicateMessage { id: String },

    /// The assistant backend failed to answer.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidReply error
    pub fn invalid_reply(id: impl Into<String>) -> Self {
        Self::InvalidReply { id: id.into() }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an Unauthorized error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if this is an InvalidReply error
    pub fn is_invalid_reply(&self) -> bool {
        matches!(self, Self::InvalidReply { .. })
    }

    /// Check if this is a gateway error
    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::Gateway(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ChatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
