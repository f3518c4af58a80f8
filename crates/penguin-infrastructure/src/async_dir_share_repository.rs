//! Directory-backed ShareRepository implementation.
//!
//! Each snapshot is one TOML file named after its token. Files are written
//! once through [`AtomicTomlFile::create_new`] and never modified.

use crate::dto::ShareSnapshotV1;
use crate::paths::PenguinPaths;
use crate::storage::{AtomicTomlError, AtomicTomlFile};
use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use penguin_core::chat::Message;
use penguin_core::share::{ShareRepository, ShareSnapshot, ShareToken};
use penguin_core::{ChatError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Attempts before giving up on finding an unused token.
const MAX_TOKEN_ATTEMPTS: usize = 4;

/// Snapshot repository storing one file per token.
///
/// Directory structure:
/// ```text
/// base_dir/
/// ├── 3f2c...e1.toml
/// └── 9a07...4b.toml
/// ```
pub struct AsyncDirShareRepository {
    base_dir: PathBuf,
}

impl AsyncDirShareRepository {
    /// Creates a repository at the default location (`<data_dir>/penguin/shares`).
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined or created.
    pub async fn default_location() -> AnyResult<Self> {
        let base_dir = PenguinPaths::shares_dir()
            .map_err(|e| anyhow::anyhow!("Failed to get shares directory: {}", e))?;
        Self::new(base_dir).await
    }

    /// Creates a new repository rooted at `base_dir`, creating it if needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> AnyResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .with_context(|| format!("Failed to create shares directory {:?}", base_dir))?;

        Ok(Self { base_dir })
    }

    pub fn shares_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File path for a token, or `None` if the token cannot name a file.
    fn snapshot_path(&self, token: &ShareToken) -> Option<PathBuf> {
        let raw = token.as_str();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.base_dir.join(format!("{raw}.toml")))
    }
}

#[async_trait]
impl ShareRepository for AsyncDirShareRepository {
    async fn save(&self, messages: &[Message]) -> Result<ShareToken> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = ShareToken::generate();
            let path = self
                .snapshot_path(&token)
                .ok_or_else(|| ChatError::internal("generated an unusable share token"))?;
            let dto = ShareSnapshotV1::from(&ShareSnapshot::new(token.clone(), messages.to_vec()));

            let written = tokio::task::spawn_blocking(move || {
                AtomicTomlFile::<ShareSnapshotV1>::new(path).create_new(&dto)
            })
            .await
            .map_err(|e| ChatError::internal(format!("share write task failed: {e}")))?;

            match written {
                Ok(()) => {
                    tracing::info!(token = %token, messages = messages.len(), "Stored share snapshot");
                    return Ok(token);
                }
                Err(AtomicTomlError::AlreadyExists(path)) => {
                    tracing::warn!(path = %path.display(), "Share token collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ChatError::internal("could not allocate a unique share token"))
    }

    async fn load(&self, token: &ShareToken) -> Result<Option<ShareSnapshot>> {
        let Some(path) = self.snapshot_path(token) else {
            tracing::debug!(token = %token, "Rejected malformed share token");
            return Ok(None);
        };

        let loaded = tokio::task::spawn_blocking(move || {
            AtomicTomlFile::<ShareSnapshotV1>::new(path).load()
        })
        .await
        .map_err(|e| ChatError::internal(format!("share read task failed: {e}")))??;

        loaded.map(ShareSnapshot::try_from).transpose()
    }
}
