//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/penguin/config.toml).

use crate::paths::PenguinPaths;
use crate::storage::AtomicTomlFile;
use penguin_core::Result;
use penguin_core::config::{GatewayKind, PenguinConfig};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Overrides the gateway endpoint (and switches to the HTTP gateway).
pub const ENV_GATEWAY_ENDPOINT: &str = "PENGUIN_GATEWAY_ENDPOINT";
/// Overrides the gateway bearer token.
pub const ENV_API_KEY: &str = "PENGUIN_API_KEY";

/// Configuration service that loads and caches the root configuration.
///
/// A missing or empty file yields the defaults. Environment variables are
/// applied on top of whatever the file says.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<PenguinConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading `~/.config/penguin/config.toml`.
    ///
    /// Without a resolvable home directory only defaults and env apply.
    pub fn default_location() -> Self {
        Self {
            path: PenguinPaths::config_file().ok(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn get_config(&self) -> Result<PenguinConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> Result<PenguinConfig> {
        let mut config = match &self.path {
            Some(path) => {
                let file = AtomicTomlFile::<PenguinConfig>::new(path.clone());
                let loaded = file.load()?;
                if loaded.is_none() {
                    tracing::debug!(path = %path.display(), "No config file, using defaults");
                }
                loaded.unwrap_or_default()
            }
            None => PenguinConfig::default(),
        };

        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::default_location()
    }
}

fn apply_env_overrides(config: &mut PenguinConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(endpoint) = lookup(ENV_GATEWAY_ENDPOINT).filter(|v| !v.trim().is_empty()) {
        config.gateway.endpoint = Some(endpoint);
        config.gateway.kind = GatewayKind::Http;
    }
    if let Some(api_key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        config.gateway.api_key = Some(api_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penguin_core::config::ShareStorageKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let config = service.load_config().unwrap();
        assert_eq!(config.share.storage, ShareStorageKind::Directory);
    }

    #[test]
    fn test_reads_file_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[share]
origin = "https://chat.example"
storage = "memory"
"#,
        )
        .unwrap();

        let service = ConfigService::new(&path);
        let config = service.get_config().unwrap();
        assert_eq!(config.share.origin, "https://chat.example");
        assert_eq!(config.share.storage, ShareStorageKind::Memory);

        // Cached until invalidated
        fs::write(&path, "[share]\norigin = \"https://other.example\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().share.origin, "https://chat.example");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().share.origin, "https://other.example");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[gateway\nkind = ").unwrap();

        let err = ConfigService::new(&path).get_config().unwrap_err();
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PenguinConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            ENV_GATEWAY_ENDPOINT => Some("https://api.example/chat".to_string()),
            ENV_API_KEY => Some("secret".to_string()),
            _ => None,
        });

        assert_eq!(config.gateway.kind, GatewayKind::Http);
        assert_eq!(config.gateway.endpoint.as_deref(), Some("https://api.example/chat"));
        assert_eq!(config.gateway.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = PenguinConfig::default();
        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config, PenguinConfig::default());
    }
}
