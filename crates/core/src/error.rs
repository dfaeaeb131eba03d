//! Error taxonomy for the conversion pipeline.

use crate::fs::FsError;
use crate::platform::Platform;
use crate::validation::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaptikError>;

/// Terminal failures of a pipeline stage.
///
/// Every variant maps to a stable [`code`](TaptikError::code) and, where the
/// user can act on it, a [`suggestion`](TaptikError::suggestion).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum TaptikError {
    /// `detect` found none of the platform's marker files.
    #[error("{} is not a {} project", .path.display(), .platform.display_name())]
    NotAPlatformProject { platform: Platform, path: PathBuf },

    /// Detection over every known platform found nothing.
    #[error("no Claude Code, Kiro or Cursor configuration found in {}", .path.display())]
    NoPlatformDetected { path: PathBuf },

    /// Structural or security validation produced errors.
    #[error("{} configuration failed validation with {} error(s)", .platform.display_name(), .errors.len())]
    ValidationFailed {
        platform: Platform,
        errors: Vec<ValidationError>,
    },

    /// Conversion was requested but the source platform section is missing or empty.
    #[error("no {} configuration found in context", .platform.display_name())]
    NoSourceConfiguration { platform: Platform },

    /// A filesystem operation failed during extract or deploy.
    #[error("failed to {operation} {}: {message}", .path.display())]
    FileOperationFailed {
        operation: String,
        path: PathBuf,
        message: String,
        suggestion: String,
    },

    /// No converter (direct or chained) exists for the pair.
    #[error("no converter registered from {from} to {to}")]
    UnsupportedConversion { from: Platform, to: Platform },

    #[error("context version '{found}' does not satisfy {required}")]
    UnsupportedVersion { found: String, required: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TaptikError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAPlatformProject { .. } => "NOT_A_PLATFORM_PROJECT",
            Self::NoPlatformDetected { .. } => "NO_PLATFORM_DETECTED",
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::NoSourceConfiguration { .. } => "NO_SOURCE_CONFIGURATION",
            Self::FileOperationFailed { .. } => "FILE_OPERATION_FAILED",
            Self::UnsupportedConversion { .. } => "UNSUPPORTED_CONVERSION",
            Self::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            Self::Serialization(_) => "SERIALIZATION",
        }
    }

    /// Returns actionable guidance for the user.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotAPlatformProject { platform, .. } => Some(format!(
                "Run from the project root or pass a path that contains {} configuration",
                platform.display_name()
            )),
            Self::NoPlatformDetected { .. } => {
                Some("Pass --platform explicitly or run from a configured project root".to_string())
            }
            Self::ValidationFailed { errors, .. } => errors
                .iter()
                .find_map(|e| e.suggestion.clone())
                .or_else(|| Some("Fix the reported fields and rebuild".to_string())),
            Self::NoSourceConfiguration { platform } => Some(format!(
                "Build the context from a {} project before converting",
                platform.display_name()
            )),
            Self::FileOperationFailed { suggestion, .. } => Some(suggestion.clone()),
            Self::UnsupportedConversion { .. } => {
                Some("Run `taptik pairs` to list supported conversions".to_string())
            }
            Self::UnsupportedVersion { required, .. } => Some(format!(
                "Re-export the context with a taptik release that writes {required}"
            )),
            Self::Serialization(_) => None,
        }
    }

    /// Wraps a filesystem error with the operation being attempted.
    pub fn file_operation(operation: impl Into<String>, err: FsError) -> Self {
        let suggestion = match &err {
            FsError::NotFound { .. } => "Check that the path exists".to_string(),
            FsError::Parse { .. } => "Fix the JSON syntax in the file".to_string(),
            FsError::Io { .. } => "Check file permissions and available disk space".to_string(),
        };
        Self::FileOperationFailed {
            operation: operation.into(),
            path: err.path().to_path_buf(),
            message: err.to_string(),
            suggestion,
        }
    }
}

impl From<serde_json::Error> for TaptikError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
