//! Transient request state of a chat session.

use super::message::MessageId;
use serde::{Deserialize, Serialize};

/// Whether the session is accepting input or waiting on the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChatPhase {
    /// Accepting input.
    #[default]
    Idle,
    /// One assistant request is in flight.
    AwaitingAssistant,
}

/// Per-session state that is never part of the conversation log.
///
/// Owned by exactly one orchestrator and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingState {
    pub phase: ChatPhase,
    /// Message the next user send will reply to.
    pub reply_target: Option<MessageId>,
    /// Reason of the most recent gateway failure, for the error banner.
    pub last_error: Option<String>,
}

impl PendingState {
    pub fn is_awaiting(&self) -> bool {
        self.phase == ChatPhase::AwaitingAssistant
    }
}
