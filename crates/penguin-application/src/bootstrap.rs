use penguin_core::auth::ChatAuthorization;
use penguin_core::config::{PenguinConfig, ShareStorageKind};
use penguin_core::share::ShareRepository;
use penguin_core::{ChatError, Result};
use penguin_infrastructure::{AsyncDirShareRepository, MemoryShareRepository};
use penguin_interaction::build_gateway;
use std::path::PathBuf;
use std::sync::Arc;

use crate::chat::{ChatOrchestrator, ChatSession, ChatSessionHandle};

/// Factory wiring a chat session from configuration.
///
/// Resolves the gateway and the share store named by [`PenguinConfig`]
/// and hands them to a fresh [`ChatOrchestrator`].
pub struct ChatBootstrap {
    config: PenguinConfig,
    /// Overrides the default shares directory.
    shares_dir: Option<PathBuf>,
}

impl ChatBootstrap {
    pub fn new(config: PenguinConfig) -> Self {
        Self {
            config,
            shares_dir: None,
        }
    }

    /// Stores directory-backed shares under `dir` instead of the data dir.
    pub fn with_shares_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shares_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &PenguinConfig {
        &self.config
    }

    /// Creates the share repository selected by `share.storage`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the shares directory cannot be created.
    pub async fn share_repository(&self) -> Result<Arc<dyn ShareRepository>> {
        match self.config.share.storage {
            ShareStorageKind::Memory => Ok(Arc::new(MemoryShareRepository::new())),
            ShareStorageKind::Directory => {
                let repository = match &self.shares_dir {
                    Some(dir) => AsyncDirShareRepository::new(dir).await,
                    None => AsyncDirShareRepository::default_location().await,
                }
                .map_err(|e| ChatError::io(format!("{e:#}")))?;
                tracing::info!(dir = %repository.shares_dir().display(), "Using directory share storage");
                Ok(Arc::new(repository))
            }
        }
    }

    /// Builds an orchestrator for one session.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the gateway settings are incomplete, or `Io` if the
    /// share store cannot be opened.
    pub async fn build_orchestrator(
        &self,
        authorization: Arc<dyn ChatAuthorization>,
    ) -> Result<ChatOrchestrator> {
        let gateway = build_gateway(&self.config.gateway)?;
        let share_repository = self.share_repository().await?;

        Ok(ChatOrchestrator::new(
            gateway,
            share_repository,
            authorization,
            self.config.share.origin.clone(),
        ))
    }

    /// Builds an orchestrator and starts its session task.
    pub async fn start_session(
        &self,
        authorization: Arc<dyn ChatAuthorization>,
    ) -> Result<ChatSessionHandle> {
        let orchestrator = self.build_orchestrator(authorization).await?;
        Ok(ChatSession::spawn(orchestrator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penguin_core::auth::AccountStatus;
    use penguin_core::chat::ChatPhase;
    use penguin_core::config::{GatewayConfig, GatewayKind};
    use tempfile::TempDir;

    fn offline_config(storage: ShareStorageKind) -> PenguinConfig {
        let mut config = PenguinConfig::default();
        config.gateway.simulated_delay_ms = 0;
        config.share.storage = storage;
        config.share.origin = "https://chat.example".to_string();
        config
    }

    #[tokio::test]
    async fn test_directory_storage_uses_override() {
        let temp_dir = TempDir::new().unwrap();
        let shares_dir = temp_dir.path().join("shares");
        let bootstrap = ChatBootstrap::new(offline_config(ShareStorageKind::Directory))
            .with_shares_dir(&shares_dir);

        let mut chat = bootstrap
            .build_orchestrator(Arc::new(AccountStatus::approved()))
            .await
            .unwrap();
        chat.send("hello", vec![]).await.unwrap();
        let link = chat.share().await.unwrap().unwrap();

        assert!(link.url.starts_with("https://chat.example/chat/"));
        assert!(shares_dir.join(format!("{}.toml", link.token)).exists());
        assert_eq!(chat.phase(), ChatPhase::Idle);
    }

    #[tokio::test]
    async fn test_http_gateway_without_endpoint_fails() {
        let mut config = offline_config(ShareStorageKind::Memory);
        config.gateway = GatewayConfig {
            kind: GatewayKind::Http,
            ..GatewayConfig::default()
        };

        let result = ChatBootstrap::new(config)
            .build_orchestrator(Arc::new(AccountStatus::approved()))
            .await;
        assert!(matches!(result, Err(ChatError::Config(_))));
    }

    #[tokio::test]
    async fn test_start_session_serves_view() {
        let session = ChatBootstrap::new(offline_config(ShareStorageKind::Memory))
            .start_session(Arc::new(AccountStatus::approved()))
            .await
            .unwrap();

        session.send("hello", vec![]).await.unwrap();
        let view = session.wait_idle().await.unwrap();
        assert_eq!(view.messages.len(), 3);
    }
}
