//! Crash-safe TOML documents.
//!
//! Writes go to a sibling temp file which is fsynced and then hard-linked
//! into place. The OS refuses the link when the target exists, so a
//! published document is never replaced.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File};
use std::io::{ErrorKind, Write as IoWrite};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Error, Debug)]
pub enum AtomicTomlError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// The write-once target is already taken.
    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

impl From<AtomicTomlError> for penguin_core::ChatError {
    fn from(e: AtomicTomlError) -> Self {
        match e {
            AtomicTomlError::IoError(io) => io.into(),
            AtomicTomlError::TomlError(de) => de.into(),
            AtomicTomlError::TomlSerError(ser) => ser.into(),
            AtomicTomlError::AlreadyExists(path) => {
                penguin_core::ChatError::internal(format!("refusing to overwrite {}", path.display()))
            }
        }
    }
}

/// A TOML document at a fixed path, typed by its DTO.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and deserializes the document.
    ///
    /// A missing or blank file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(toml::from_str(&content)?))
    }

    /// Publishes the document only if nothing is at the path yet.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the target is present; the existing file is untouched.
    pub fn create_new(&self, data: &T) -> Result<(), AtomicTomlError> {
        let tmp_path = self.write_temp(data)?;
        let linked = fs::hard_link(&tmp_path, &self.path);
        let _ = fs::remove_file(&tmp_path);

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(AtomicTomlError::AlreadyExists(self.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Serializes `data` into a fresh, fsynced temp file next to the target.
    fn write_temp(&self, data: &T) -> Result<PathBuf, AtomicTomlError> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(ErrorKind::InvalidInput, "Path has no parent directory")
        })?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "Path has no file name"))?;
        fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = parent.join(format!(
            ".{}.{}.{}.tmp",
            file_name.to_string_lossy(),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;

        Ok(tmp_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        revision: u32,
    }

    fn note(revision: u32) -> Note {
        Note {
            title: "shared chat".to_string(),
            revision,
        }
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn test_missing_and_blank_files_load_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let missing = AtomicTomlFile::<Note>::new(temp_dir.path().join("missing.toml"));
        assert!(missing.load().unwrap().is_none());

        let blank_path = temp_dir.path().join("blank.toml");
        fs::write(&blank_path, "  \n").unwrap();
        assert!(AtomicTomlFile::<Note>::new(blank_path).load().unwrap().is_none());
    }

    #[test]
    fn test_create_new_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Note>::new(temp_dir.path().join("once.toml"));

        file.create_new(&note(1)).unwrap();
        let err = file.create_new(&note(2)).unwrap_err();

        assert!(matches!(err, AtomicTomlError::AlreadyExists(_)));
        assert_eq!(file.load().unwrap(), Some(note(1)));
        assert_eq!(leftover_temp_files(temp_dir.path()), 0);
    }

    #[test]
    fn test_creates_missing_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a").join("b").join("note.toml");

        AtomicTomlFile::<Note>::new(file_path.clone())
            .create_new(&note(5))
            .unwrap();
        assert!(file_path.exists());
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "title = [unterminated").unwrap();

        let err = AtomicTomlFile::<Note>::new(path).load().unwrap_err();
        assert!(matches!(err, AtomicTomlError::TomlError(_)));
    }
}
