//! Assistant gateway contract.
//!
//! The gateway is the single external call boundary of the chat core: it
//! takes the user's message plus the prior exchange history and returns the
//! assistant's reply. Transport adapters live in `penguin-interaction`.

use crate::chat::HistoryEntry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A successful assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    /// The reply body, possibly containing fenced code blocks.
    pub response: String,
}

impl AssistantReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// Failure of a single gateway call.
///
/// The kinds exist for logging only. Callers of the orchestrator never see
/// them: every failure is recovered into the same apology message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayError {
    /// The request could not be delivered (DNS, connect, TLS...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {code}: {message}")]
    Status { code: u16, message: String },

    /// The backend answered but the body was not a valid reply.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// No answer within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
}

impl GatewayError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }
}

/// An abstract assistant backend.
///
/// One call is one request: implementations must not retry internally.
/// Timeouts are the implementation's concern.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Asks the assistant to answer `message` given the earlier `history`.
    ///
    /// `history` is in conversation order and does not include `message`.
    async fn ask(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<AssistantReply, GatewayError>;
}
