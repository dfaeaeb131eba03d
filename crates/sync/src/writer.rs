//! Writes rendered platform files next to whatever already exists on disk.

use crate::report::{DeployResult, SkipReason};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use taptik_core::fs::read_optional;
use taptik_core::{FileSystem, FsError, TaptikError};
use tracing::{debug, info, warn};

/// How a planned file interacts with an existing file at the same path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Discard the existing file.
    Replace,
    /// Shallow-merge JSON objects (new wins per top-level key); replace text.
    #[default]
    Merge,
    /// Never touch an existing file.
    Skip,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" | "overwrite" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unknown merge policy '{other}' (expected replace, merge or skip)"
            )),
        }
    }
}

/// Body of a planned file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    Json(Value),
    Text(String),
}

impl FileContent {
    /// Bytes as they will be written.
    pub fn render(&self) -> String {
        match self {
            Self::Json(value) => {
                let mut out = serde_json::to_string_pretty(value).unwrap_or_default();
                out.push('\n');
                out
            }
            Self::Text(text) => text.clone(),
        }
    }
}

/// A file a builder wants to exist, relative to the deployment root.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub content: FileContent,
}

impl PlannedFile {
    pub fn json(path: impl Into<PathBuf>, value: Value) -> Self {
        Self {
            path: path.into(),
            content: FileContent::Json(value),
        }
    }

    pub fn text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: FileContent::Text(text.into()),
        }
    }
}

fn digest(content: &str) -> Vec<u8> {
    Sha256::digest(content.as_bytes()).to_vec()
}

/// Shallow merge: every top-level key of `new` replaces the same key in `existing`.
pub fn merge_json(existing: Value, new: Value) -> Value {
    match (existing, new) {
        (Value::Object(mut base), Value::Object(over)) => {
            for (k, v) in over {
                base.insert(k, v);
            }
            Value::Object(base)
        }
        (_, new) => new,
    }
}

/// Applies a [`MergePolicy`] while writing planned files under one root.
pub struct DeploymentFileWriter<'a> {
    fs: &'a dyn FileSystem,
    policy: MergePolicy,
}

impl<'a> DeploymentFileWriter<'a> {
    pub fn new(fs: &'a dyn FileSystem, policy: MergePolicy) -> Self {
        Self { fs, policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Creates `dir`, retrying exactly once.
    fn ensure_directory(&self, dir: &Path) -> Result<(), FsError> {
        match self.fs.ensure_directory(dir) {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!(path = %dir.display(), error = %first, "Directory creation failed; retrying once");
                self.fs.ensure_directory(dir)
            }
        }
    }

    /// Content that would end up on disk, or `None` when the file must be left alone.
    fn resolve(&self, planned: &PlannedFile, existing: Option<String>) -> Option<String> {
        let rendered = planned.content.render();
        let Some(existing) = existing else {
            return Some(rendered);
        };
        match (self.policy, &planned.content) {
            (MergePolicy::Skip, _) => None,
            (MergePolicy::Replace, _) | (MergePolicy::Merge, FileContent::Text(_)) => Some(rendered),
            (MergePolicy::Merge, FileContent::Json(new)) => {
                match serde_json::from_str::<Value>(&existing) {
                    Ok(old) => {
                        let merged = FileContent::Json(merge_json(old, new.clone()));
                        Some(merged.render())
                    }
                    Err(err) => {
                        warn!(path = %planned.path.display(), error = %err, "Existing file is not JSON; replacing");
                        Some(rendered)
                    }
                }
            }
        }
    }

    /// Writes every planned file under `root`.
    ///
    /// Directories are created before any file is written. The first I/O
    /// failure stops further writes.
    pub fn write_all(&self, root: &Path, files: &[PlannedFile]) -> DeployResult {
        let mut result = DeployResult::new();

        let mut dirs: BTreeSet<PathBuf> = BTreeSet::new();
        dirs.insert(root.to_path_buf());
        for file in files {
            if let Some(parent) = root.join(&file.path).parent() {
                dirs.insert(parent.to_path_buf());
            }
        }
        for dir in &dirs {
            if let Err(err) = self.ensure_directory(dir) {
                result.push_error(TaptikError::file_operation("create directory", err));
                return result;
            }
        }

        for planned in files {
            let path = root.join(&planned.path);
            let existing = match read_optional(self.fs, &path) {
                Ok(existing) => existing,
                Err(err) => {
                    result.push_error(TaptikError::file_operation("read", err));
                    break;
                }
            };
            let existed = existing.is_some();
            let existing_digest = existing.as_deref().map(digest);

            let Some(content) = self.resolve(planned, existing) else {
                debug!(path = %path.display(), "Existing file kept (merge policy: skip)");
                result
                    .skipped_files
                    .push(SkipReason::ExistingFile { path: planned.path.clone() });
                continue;
            };

            if existing_digest == Some(digest(&content)) {
                result
                    .skipped_files
                    .push(SkipReason::Unchanged { path: planned.path.clone() });
                continue;
            }

            if let Err(err) = self.fs.write_file(&path, &content) {
                result.push_error(TaptikError::file_operation("write", err));
                break;
            }
            debug!(path = %path.display(), existed, policy = %self.policy, "Wrote file");
            result.deployed_files.push(planned.path.clone());
        }

        info!(
            root = %root.display(),
            deployed = result.deployed_files.len(),
            skipped = result.skipped_files.len(),
            errors = result.errors.len(),
            "Deployment finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use taptik_core::LocalFileSystem;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, LocalFileSystem) {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFileSystem::with_home(tmp.path());
        (tmp, fs)
    }

    #[test]
    fn test_new_files_are_written_with_directories() {
        let (tmp, fs) = fixture();
        let writer = DeploymentFileWriter::new(&fs, MergePolicy::Merge);
        let result = writer.write_all(
            tmp.path(),
            &[
                PlannedFile::text(".claude/commands/review.md", "Review the diff"),
                PlannedFile::json(".mcp.json", json!({"mcpServers": {}})),
            ],
        );
        assert!(result.success);
        assert_eq!(result.deployed_files.len(), 2);
        let written = std::fs::read_to_string(tmp.path().join(".claude/commands/review.md")).unwrap();
        assert_eq!(written, "Review the diff");
    }

    #[test]
    fn test_merge_policy_shallow_merges_json() {
        let (tmp, fs) = fixture();
        std::fs::write(
            tmp.path().join("settings.json"),
            r#"{"model": "old", "theme": "dark", "nested": {"a": 1}}"#,
        )
        .unwrap();
        let writer = DeploymentFileWriter::new(&fs, MergePolicy::Merge);
        writer.write_all(
            tmp.path(),
            &[PlannedFile::json(
                "settings.json",
                json!({"model": "new", "nested": {"b": 2}}),
            )],
        );
        let merged: Value =
            serde_json::from_str(&std::fs::read_to_string(tmp.path().join("settings.json")).unwrap())
                .unwrap();
        assert_eq!(
            merged,
            json!({"model": "new", "theme": "dark", "nested": {"b": 2}})
        );
    }

    #[test]
    fn test_skip_policy_leaves_existing_bytes() {
        let (tmp, fs) = fixture();
        std::fs::write(tmp.path().join("CLAUDE.md"), "mine").unwrap();
        let writer = DeploymentFileWriter::new(&fs, MergePolicy::Skip);
        let result = writer.write_all(
            tmp.path(),
            &[
                PlannedFile::text("CLAUDE.md", "theirs"),
                PlannedFile::text("CLAUDE.local.md", "new"),
            ],
        );
        assert!(result.success);
        assert!(result.is_partial());
        assert_eq!(result.deployed_files, vec![PathBuf::from("CLAUDE.local.md")]);
        assert_eq!(std::fs::read_to_string(tmp.path().join("CLAUDE.md")).unwrap(), "mine");
    }

    #[test]
    fn test_identical_content_is_unchanged() {
        let (tmp, fs) = fixture();
        std::fs::write(tmp.path().join("a.md"), "same").unwrap();
        let writer = DeploymentFileWriter::new(&fs, MergePolicy::Replace);
        let result = writer.write_all(tmp.path(), &[PlannedFile::text("a.md", "same")]);
        assert!(result.deployed_files.is_empty());
        assert_eq!(
            result.skipped_files,
            vec![SkipReason::Unchanged { path: "a.md".into() }]
        );
    }

    #[test]
    fn test_zero_files_is_success() {
        let (tmp, fs) = fixture();
        let target = tmp.path().join("fresh");
        let result = DeploymentFileWriter::new(&fs, MergePolicy::Merge).write_all(&target, &[]);
        assert!(result.success);
        assert!(result.deployed_files.is_empty());
        assert!(target.is_dir());
    }

    /// Fails the first `failures` directory creations, then delegates.
    struct FlakyDirs {
        inner: LocalFileSystem,
        failures: AtomicUsize,
        attempts: AtomicUsize,
    }

    impl FileSystem for FlakyDirs {
        fn exists(&self, path: &Path) -> Result<bool, FsError> {
            self.inner.exists(path)
        }
        fn is_directory(&self, path: &Path) -> Result<bool, FsError> {
            self.inner.is_directory(path)
        }
        fn read_file(&self, path: &Path) -> Result<String, FsError> {
            self.inner.read_file(path)
        }
        fn read_json(&self, path: &Path) -> Result<Value, FsError> {
            self.inner.read_json(path)
        }
        fn read_directory(&self, path: &Path) -> Result<Vec<String>, FsError> {
            self.inner.read_directory(path)
        }
        fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError> {
            self.inner.write_file(path, content)
        }
        fn write_json(&self, path: &Path, value: &Value) -> Result<(), FsError> {
            self.inner.write_json(path, value)
        }
        fn ensure_directory(&self, path: &Path) -> Result<(), FsError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(FsError::Io {
                    path: path.to_path_buf(),
                    message: "EAGAIN".into(),
                });
            }
            self.inner.ensure_directory(path)
        }
        fn delete_file(&self, path: &Path) -> Result<(), FsError> {
            self.inner.delete_file(path)
        }
        fn user_home(&self) -> Option<PathBuf> {
            self.inner.user_home()
        }
    }

    fn flaky(failures: usize) -> (TempDir, FlakyDirs) {
        let (tmp, inner) = fixture();
        let fs = FlakyDirs {
            inner,
            failures: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        };
        (tmp, fs)
    }

    #[test]
    fn test_directory_creation_retried_once() {
        let (tmp, fs) = flaky(1);
        let result = DeploymentFileWriter::new(&fs, MergePolicy::Merge)
            .write_all(tmp.path(), &[PlannedFile::text("CLAUDE.md", "x")]);
        assert!(result.success);
        assert_eq!(fs.attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_directory_creation_fails_after_one_retry() {
        let (tmp, fs) = flaky(2);
        let result = DeploymentFileWriter::new(&fs, MergePolicy::Merge)
            .write_all(tmp.path(), &[PlannedFile::text("CLAUDE.md", "x")]);
        assert!(!result.success);
        assert_eq!(fs.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(result.errors[0].code(), "FILE_OPERATION_FAILED");
        assert!(!tmp.path().join("CLAUDE.md").exists());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("SKIP".parse::<MergePolicy>().unwrap(), MergePolicy::Skip);
        assert!("sometimes".parse::<MergePolicy>().is_err());
        assert_eq!(MergePolicy::default(), MergePolicy::Merge);
    }
}
