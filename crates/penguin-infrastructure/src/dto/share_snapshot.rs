//! ShareSnapshot DTOs.
//!
//! The on-disk shape of a shared conversation. Kept separate from the domain
//! model so the file format can evolve with an explicit schema version.

use chrono::{DateTime, Utc};
use penguin_core::chat::{Attachment, Message, MessageId, MessageRole};
use penguin_core::share::{ShareSnapshot, ShareToken};
use penguin_core::{ChatError, Result};
use serde::{Deserialize, Serialize};

/// Current schema version written by this build.
pub const SHARE_SNAPSHOT_V1_VERSION: &str = "1.0.0";

fn default_snapshot_version() -> String {
    SHARE_SNAPSHOT_V1_VERSION.to_string()
}

/// Attachment descriptor as stored in a snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentV1 {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub media_type: String,
}

/// Message as stored in a snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageV1 {
    pub id: String,
    /// "user" or "assistant"
    pub role: String,
    pub body: String,
    /// RFC 3339 timestamp
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentV1>,
}

/// A shared conversation snapshot file (DTO V1.0.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareSnapshotV1 {
    #[serde(default = "default_snapshot_version")]
    pub schema_version: String,
    pub token: String,
    /// RFC 3339 timestamp
    pub created_at: String,
    #[serde(default)]
    pub messages: Vec<MessageV1>,
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl From<&Attachment> for AttachmentV1 {
    fn from(attachment: &Attachment) -> Self {
        AttachmentV1 {
            name: attachment.name.clone(),
            size_bytes: attachment.size_bytes,
            media_type: attachment.media_type.clone(),
        }
    }
}

impl From<AttachmentV1> for Attachment {
    fn from(dto: AttachmentV1) -> Self {
        Attachment::new(dto.name, dto.size_bytes, dto.media_type)
    }
}

impl From<&Message> for MessageV1 {
    fn from(message: &Message) -> Self {
        MessageV1 {
            id: message.id.to_string(),
            role: message.role.as_str().to_string(),
            body: message.body.clone(),
            created_at: message.created_at.to_rfc3339(),
            reply_target: message.reply_target.as_ref().map(|id| id.to_string()),
            attachments: message.attachments.iter().map(AttachmentV1::from).collect(),
        }
    }
}

impl TryFrom<MessageV1> for Message {
    type Error = ChatError;

    fn try_from(dto: MessageV1) -> Result<Self> {
        let role = match dto.role.as_str() {
            "user" => MessageRole::User,
            "assistant" => MessageRole::Assistant,
            other => {
                return Err(ChatError::Serialization {
                    format: "TOML".to_string(),
                    message: format!("unknown message role '{other}'"),
                });
            }
        };

        Ok(Message {
            id: MessageId::from(dto.id),
            role,
            body: dto.body,
            created_at: parse_timestamp(&dto.created_at)?,
            attachments: dto.attachments.into_iter().map(Attachment::from).collect(),
            reply_target: dto.reply_target.map(MessageId::from),
        })
    }
}

impl From<&ShareSnapshot> for ShareSnapshotV1 {
    fn from(snapshot: &ShareSnapshot) -> Self {
        ShareSnapshotV1 {
            schema_version: SHARE_SNAPSHOT_V1_VERSION.to_string(),
            token: snapshot.token.to_string(),
            created_at: snapshot.created_at.to_rfc3339(),
            messages: snapshot.messages.iter().map(MessageV1::from).collect(),
        }
    }
}

impl TryFrom<ShareSnapshotV1> for ShareSnapshot {
    type Error = ChatError;

    fn try_from(dto: ShareSnapshotV1) -> Result<Self> {
        if dto.schema_version != SHARE_SNAPSHOT_V1_VERSION {
            return Err(ChatError::Serialization {
                format: "TOML".to_string(),
                message: format!(
                    "unsupported share snapshot schema version '{}'",
                    dto.schema_version
                ),
            });
        }

        let messages = dto
            .messages
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(ShareSnapshot {
            token: ShareToken::from(dto.token),
            messages,
            created_at: parse_timestamp(&dto.created_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| ChatError::Serialization {
            format: "RFC3339".to_string(),
            message: format!("invalid timestamp '{value}': {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use penguin_core::chat::Conversation;

    fn sample_snapshot() -> ShareSnapshot {
        let mut conversation = Conversation::seed();
        let greeting = conversation.messages()[0].id.clone();
        conversation
            .push(Message::user(
                "what is in this file?",
                vec![Attachment::new("report.pdf", 2048, "application/pdf")],
                Some(greeting),
            ))
            .unwrap();
        conversation
            .push(Message::assistant("A report:\n```text\nQ3 numbers\n```"))
            .unwrap();
        ShareSnapshot::new(ShareToken::generate(), conversation.into_messages())
    }

    #[test]
    fn test_snapshot_survives_toml() {
        let snapshot = sample_snapshot();
        let text = toml::to_string_pretty(&ShareSnapshotV1::from(&snapshot)).unwrap();

        assert!(text.contains("schema_version = \"1.0.0\""));

        let dto: ShareSnapshotV1 = toml::from_str(&text).unwrap();
        let restored = ShareSnapshot::try_from(dto).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let dto = MessageV1 {
            id: "1".to_string(),
            role: "system".to_string(),
            body: "x".to_string(),
            created_at: Utc::now().to_rfc3339(),
            reply_target: None,
            attachments: vec![],
        };
        assert!(Message::try_from(dto).is_err());
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let mut dto = ShareSnapshotV1::from(&sample_snapshot());
        dto.schema_version = "9.0.0".to_string();
        let err = ShareSnapshot::try_from(dto).unwrap_err();
        assert!(err.to_string().contains("9.0.0"));
    }
}
