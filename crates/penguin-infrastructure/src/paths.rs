//! Unified path management for penguin configuration and data files.
//!
//! This ensures consistency across all platforms (Linux, macOS, Windows).

use std::path::PathBuf;

const APP_DIR_NAME: &str = "penguin";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for penguin.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/penguin/           # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/penguin/      # Data directory
/// └── shares/                  # Shared conversation snapshots
///     └── <token>.toml
/// ```
pub struct PenguinPaths;

impl PenguinPaths {
    /// Returns the penguin configuration directory (e.g., `~/.config/penguin/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the penguin data directory (e.g., `~/.local/share/penguin/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory holding shared snapshots.
    pub fn shares_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("shares"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let Ok(config_dir) = PenguinPaths::config_dir() else {
            return; // no home directory in this environment
        };
        assert!(config_dir.ends_with("penguin"));
        let config_file = PenguinPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_shares_dir() {
        let Ok(data_dir) = PenguinPaths::data_dir() else {
            return;
        };
        let shares_dir = PenguinPaths::shares_dir().unwrap();
        assert!(shares_dir.ends_with("shares"));
        assert!(shares_dir.starts_with(&data_dir));
    }
}
