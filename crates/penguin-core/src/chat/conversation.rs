//! Conversation log model.
//!
//! A [`Conversation`] is the ordered, append-only message log of one chat
//! session. It is created seeded with the assistant greeting and only the
//! explicit reset replaces it.

use super::message::{Message, MessageId, MessageRole};
use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};

/// Body of the assistant message every conversation starts with.
pub const GREETING: &str = "Hello! I'm Penguin AI, your intelligent assistant. I can help you with coding, mathematics, general reasoning, and much more. Feel free to send me text, images, documents, or audio files - I'm here to help!";

/// One `{role, content}` pair of the history handed to the assistant gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

/// The ordered message log of one session.
///
/// Invariants:
/// - message ids are unique
/// - every `reply_target` names a message that precedes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates a conversation holding only the assistant greeting.
    pub fn seed() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
        }
    }

    /// Discards the whole log and starts over from the greeting.
    ///
    /// Nothing of the previous conversation is archived.
    pub fn reset() -> Self {
        Self::seed()
    }

    /// Rebuilds a conversation from a stored message list, checking invariants.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self> {
        let mut conversation = Self {
            messages: Vec::with_capacity(messages.len()),
        };
        for message in messages {
            conversation.push(message)?;
        }
        Ok(conversation)
    }

    /// Returns a new conversation with `message` appended.
    ///
    /// # Errors
    ///
    /// - `InvalidReply` if the reply target is not in this conversation
    /// - `DuplicateMessage` if the id is already used
    pub fn append(&self, message: Message) -> Result<Self> {
        let mut next = self.clone();
        next.push(message)?;
        Ok(next)
    }

    /// Appends `message` in place, with the same checks as [`append`](Self::append).
    pub fn push(&mut self, message: Message) -> Result<()> {
        if let Some(target) = &message.reply_target {
            if !self.contains(target) {
                return Err(ChatError::invalid_reply(target.as_str()));
            }
        }
        if self.contains(&message.id) {
            return Err(ChatError::DuplicateMessage {
                id: message.id.to_string(),
            });
        }

        tracing::debug!(
            message_id = %message.id,
            role = %message.role,
            "Appending message to conversation"
        );
        self.messages.push(message);
        Ok(())
    }

    /// The `{role, content}` history in log order.
    ///
    /// Attachments and reply links are not part of the history.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .map(|message| HistoryEntry {
                role: message.role,
                content: message.body.clone(),
            })
            .collect()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|message| &message.id == id)
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| &message.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::seed()
    }
}
