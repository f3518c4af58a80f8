//! Share repository trait.
//!
//! Defines the interface for snapshot persistence operations.

use super::model::{ShareSnapshot, ShareToken};
use crate::chat::Message;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract write-once store of conversation snapshots.
///
/// # Implementation Notes
///
/// - `save` must store an independent copy and generate a token never
///   handed out before.
/// - There is no update or delete; an entry, once written, never changes.
/// - Storage is local to the device. Callers must not assume a token can be
///   resolved anywhere else.
#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Stores a copy of `messages` and returns its new token.
    ///
    /// # Returns
    ///
    /// - `Ok(ShareToken)`: Snapshot stored
    /// - `Err(_)`: Error occurred during storage
    async fn save(&self, messages: &[Message]) -> Result<ShareToken>;

    /// Loads the snapshot stored under `token`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShareSnapshot))`: Snapshot found
    /// - `Ok(None)`: No snapshot under this token
    /// - `Err(_)`: Error occurred during retrieval
    async fn load(&self, token: &ShareToken) -> Result<Option<ShareSnapshot>>;
}
