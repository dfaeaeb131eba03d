//! Filesystem collaborator used by builders and the deployment writer.
//!
//! The core never touches `std::fs` directly; everything goes through
//! [`FileSystem`] so tests can inject failures and fake home directories.

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filesystem failure. A missing file is distinct from a failed read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("{} does not exist", .path.display())]
    NotFound { path: PathBuf },
    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
    #[error("invalid JSON in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl FsError {
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
use mockall::automock;

/// Narrow filesystem interface consumed by the pipeline.
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> Result<bool, FsError>;

    fn is_directory(&self, path: &Path) -> Result<bool, FsError>;

    fn read_file(&self, path: &Path) -> Result<String, FsError>;

    fn read_json(&self, path: &Path) -> Result<Value, FsError>;

    /// Entry names (not paths) directly under `path`, sorted.
    fn read_directory(&self, path: &Path) -> Result<Vec<String>, FsError>;

    fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError>;

    fn write_json(&self, path: &Path, value: &Value) -> Result<(), FsError>;

    /// Creates `path` and any missing parents.
    fn ensure_directory(&self, path: &Path) -> Result<(), FsError>;

    fn delete_file(&self, path: &Path) -> Result<(), FsError>;

    fn user_home(&self) -> Option<PathBuf>;
}

/// Reads a text file, mapping "does not exist" to `None`.
pub fn read_optional(fs: &dyn FileSystem, path: &Path) -> Result<Option<String>, FsError> {
    match fs.read_file(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Reads a JSON file, mapping "does not exist" to `None`.
pub fn read_json_optional(fs: &dyn FileSystem, path: &Path) -> Result<Option<Value>, FsError> {
    match fs.read_json(path) {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Lists a directory, mapping "does not exist" to `None`.
pub fn list_optional(fs: &dyn FileSystem, path: &Path) -> Result<Option<Vec<String>>, FsError> {
    match fs.read_directory(path) {
        Ok(entries) => Ok(Some(entries)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    home: Option<PathBuf>,
}

impl LocalFileSystem {
    /// Uses the real home directory for user-level configuration.
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }

    /// Uses `home` in place of the user's home directory (for testing).
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        path.try_exists().map_err(|e| FsError::from_io(path, e))
    }

    fn is_directory(&self, path: &Path) -> Result<bool, FsError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FsError::from_io(path, e)),
        }
    }

    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        fs::read_to_string(path).map_err(|e| FsError::from_io(path, e))
    }

    fn read_json(&self, path: &Path) -> Result<Value, FsError> {
        let content = self.read_file(path)?;
        serde_json::from_str(&content).map_err(|e| FsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn read_directory(&self, path: &Path) -> Result<Vec<String>, FsError> {
        let entries = fs::read_dir(path).map_err(|e| FsError::from_io(path, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io(path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError> {
        fs::write(path, content).map_err(|e| FsError::from_io(path, e))
    }

    fn write_json(&self, path: &Path, value: &Value) -> Result<(), FsError> {
        let mut content = serde_json::to_string_pretty(value).map_err(|e| FsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        content.push('\n');
        self.write_file(path, &content)
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path).map_err(|e| FsError::from_io(path, e))
    }

    fn delete_file(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(path).map_err(|e| FsError::from_io(path, e))
    }

    fn user_home(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}
