//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles, attachments and reply links.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a message, unique within one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents the author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message produced by the assistant (including greetings and apologies).
    Assistant,
}

impl MessageRole {
    /// Wire name used in the gateway history payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse category of an attachment, used to pick an icon when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    Image,
    Audio,
    Video,
    Text,
    Code,
    Document,
}

/// A file attached to a user message.
///
/// Only the descriptor is kept; binary content never enters the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original file name.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// MIME type of the file (may be empty when unknown).
    pub media_type: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, size_bytes: u64, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            media_type: media_type.into(),
        }
    }

    /// Classifies the attachment by media type, falling back to the file name.
    pub fn kind(&self) -> AttachmentKind {
        let media = self.media_type.as_str();
        if media.starts_with("image/") {
            AttachmentKind::Image
        } else if media.starts_with("audio/") {
            AttachmentKind::Audio
        } else if media.starts_with("video/") {
            AttachmentKind::Video
        } else if media.contains("text") || self.name.ends_with(".txt") {
            AttachmentKind::Text
        } else if self.name.contains('.') {
            AttachmentKind::Code
        } else {
            AttachmentKind::Document
        }
    }

    /// Size in megabytes with two decimals, e.g. `"1.50 MB"`.
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}

/// A single message in a conversation log.
///
/// Messages are immutable once created. `created_at` is for display only;
/// the position in the log is the authoritative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_target: Option<MessageId>,
}

impl Message {
    /// Creates a user message.
    pub fn user(
        body: impl Into<String>,
        attachments: Vec<Attachment>,
        reply_target: Option<MessageId>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            body: body.into(),
            created_at: Utc::now(),
            attachments,
            reply_target,
        }
    }

    /// Creates an assistant message.
    pub fn assistant(body: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            body: body.into(),
            created_at: Utc::now(),
            attachments: Vec::new(),
            reply_target: None,
        }
    }

    /// Local time of day the message was created, as `HH:MM`.
    pub fn display_time(&self) -> String {
        self.created_at.with_timezone(&Local).format("%H:%M").to_string()
    }
}
