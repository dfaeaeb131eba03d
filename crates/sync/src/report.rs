//! Reporting types for what a deployment wrote and what it left alone.

use serde::Serialize;
use std::path::PathBuf;
use taptik_core::TaptikError;

/// Why a planned file was not written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SkipReason {
    /// Existing content is byte-identical to what would be written.
    Unchanged { path: PathBuf },
    /// The file exists and the merge policy is `skip`.
    ExistingFile { path: PathBuf },
    /// The rendered content contains a security finding.
    SecurityFinding { path: PathBuf, pattern: String },
}

impl SkipReason {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Unchanged { path }
            | Self::ExistingFile { path }
            | Self::SecurityFinding { path, .. } => path,
        }
    }

    /// Returns a human-readable description of the skip reason.
    pub fn description(&self) -> String {
        match self {
            Self::Unchanged { path } => format!("{} unchanged (same hash)", path.display()),
            Self::ExistingFile { path } => {
                format!("{} already exists (merge policy: skip)", path.display())
            }
            Self::SecurityFinding { path, pattern } => {
                format!("{} contains {pattern}", path.display())
            }
        }
    }

    /// Returns actionable guidance for the user.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            Self::Unchanged { .. } => None,
            Self::ExistingFile { .. } => {
                Some("Use --merge-policy merge or replace to update existing files")
            }
            Self::SecurityFinding { .. } => {
                Some("Remove the secret from the source configuration and convert again")
            }
        }
    }
}

/// Outcome of writing one platform's files.
///
/// A deployment that skipped some files but hit no errors is a partial
/// success, not a failure.
#[derive(Debug, Clone, Default)]
pub struct DeployResult {
    pub success: bool,
    pub deployed_files: Vec<PathBuf>,
    pub skipped_files: Vec<SkipReason>,
    pub errors: Vec<TaptikError>,
}

impl DeployResult {
    pub fn new() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// A deployment that never reached the filesystem.
    pub fn failed(error: TaptikError) -> Self {
        Self {
            success: false,
            errors: vec![error],
            ..Default::default()
        }
    }

    pub fn is_partial(&self) -> bool {
        self.errors.is_empty() && !self.skipped_files.is_empty()
    }

    pub(crate) fn push_error(&mut self, error: TaptikError) {
        self.errors.push(error);
        self.success = false;
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self) -> String {
        let mut out = format!(
            "Deployed {} file(s), skipped {}, {} error(s)\n",
            self.deployed_files.len(),
            self.skipped_files.len(),
            self.errors.len()
        );
        for path in &self.deployed_files {
            out.push_str(&format!("  + {}\n", path.display()));
        }
        for skip in &self.skipped_files {
            out.push_str(&format!("  = {}\n", skip.description()));
        }
        for error in &self.errors {
            out.push_str(&format!("  ! [{}] {error}\n", error.code()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_requires_no_errors() {
        let mut result = DeployResult::new();
        result.skipped_files.push(SkipReason::ExistingFile {
            path: "CLAUDE.md".into(),
        });
        assert!(result.is_partial());
        assert!(result.success);

        result.push_error(TaptikError::Serialization("boom".into()));
        assert!(!result.is_partial());
        assert!(!result.success);
    }

    #[test]
    fn test_summary_lists_every_file() {
        let result = DeployResult {
            success: true,
            deployed_files: vec![".mcp.json".into()],
            skipped_files: vec![SkipReason::Unchanged {
                path: "CLAUDE.md".into(),
            }],
            errors: vec![],
        };
        let summary = result.format_summary();
        assert!(summary.contains("+ .mcp.json"));
        assert!(summary.contains("CLAUDE.md unchanged"));
    }
}
