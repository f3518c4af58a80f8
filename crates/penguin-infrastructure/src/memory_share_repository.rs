//! In-process ShareRepository implementation.

use async_trait::async_trait;
use penguin_core::Result;
use penguin_core::chat::Message;
use penguin_core::share::{ShareRepository, ShareSnapshot, ShareToken};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps snapshots in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryShareRepository {
    snapshots: RwLock<HashMap<ShareToken, ShareSnapshot>>,
}

impl MemoryShareRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl ShareRepository for MemoryShareRepository {
    async fn save(&self, messages: &[Message]) -> Result<ShareToken> {
        let mut snapshots = self.snapshots.write().await;

        let mut token = ShareToken::generate();
        while snapshots.contains_key(&token) {
            token = ShareToken::generate();
        }

        snapshots.insert(
            token.clone(),
            ShareSnapshot::new(token.clone(), messages.to_vec()),
        );
        tracing::debug!(token = %token, messages = messages.len(), "Stored share snapshot in memory");

        Ok(token)
    }

    async fn load(&self, token: &ShareToken) -> Result<Option<ShareSnapshot>> {
        Ok(self.snapshots.read().await.get(token).cloned())
    }
}
