//! Share snapshot model.

use crate::chat::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque handle of a stored snapshot.
///
/// Only uniqueness is guaranteed; callers must not rely on its structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Generates a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShareToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ShareToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A read-only copy of a conversation taken when the user shared it.
///
/// The snapshot owns its messages, so later changes to the live
/// conversation never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSnapshot {
    pub token: ShareToken,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl ShareSnapshot {
    pub fn new(token: ShareToken, messages: Vec<Message>) -> Self {
        Self {
            token,
            messages,
            created_at: Utc::now(),
        }
    }
}

/// Builds the shareable URL `<origin>/chat/<token>`.
pub fn share_url(origin: &str, token: &ShareToken) -> String {
    format!("{}/chat/{}", origin.trim_end_matches('/'), token)
}
