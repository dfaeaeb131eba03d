//! Per-platform builders: native files to a [`TaptikContext`] and back.

pub mod checks;
pub mod claude_code;
pub mod cursor;
pub mod frontmatter;
pub mod kiro;
pub mod mcp;
pub mod merge;
pub mod traits;

pub use claude_code::ClaudeCodeBuilder;
pub use cursor::CursorBuilder;
pub use kiro::KiroBuilder;
pub use traits::{project_name, ConversionResult, Converted, PlatformBuilder, Sections};

use crate::writer::PlannedFile;
use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use taptik_core::fs::{list_optional, read_json_optional, read_optional};
use taptik_core::{
    FileSystem, FsError, McpServer, Platform, PlatformConfig, TaptikContext, TaptikError,
    ValidationResult,
};
use taptik_validate::SizeLimits;
use tracing::{debug, warn};

/// Reads a text file; a missing file is `None`.
pub(crate) fn read_text(fs: &dyn FileSystem, path: &Path) -> Result<Option<String>> {
    read_optional(fs, path).map_err(|e| TaptikError::file_operation("read", e))
}

/// Reads a JSON file; a missing file is `None`.
///
/// Unparseable files (editors tolerate comments in some of them) are
/// skipped with a warning instead of failing the whole extraction.
pub(crate) fn read_json_lenient(fs: &dyn FileSystem, path: &Path) -> Result<Option<Value>> {
    match read_json_optional(fs, path) {
        Ok(value) => Ok(value),
        Err(err @ FsError::Parse { .. }) => {
            warn!(path = %path.display(), error = %err, "Skipping unparseable JSON file");
            Ok(None)
        }
        Err(err) => Err(TaptikError::file_operation("read", err)),
    }
}

/// Reads a JSON object file; any other JSON value is skipped with a warning.
pub(crate) fn read_json_object(
    fs: &dyn FileSystem,
    path: &Path,
) -> Result<Option<Map<String, Value>>> {
    match read_json_lenient(fs, path)? {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => {
            warn!(path = %path.display(), kind = json_kind(&other), "Expected a JSON object; skipping");
            Ok(None)
        }
        None => Ok(None),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Lists `dir`, keeping names that end with `suffix`. A missing directory is `None`.
pub(crate) fn list_files(
    fs: &dyn FileSystem,
    dir: &Path,
    suffix: &str,
) -> Result<Option<Vec<String>>> {
    let entries =
        list_optional(fs, dir).map_err(|e| TaptikError::file_operation("list", e))?;
    Ok(entries.map(|names| {
        names
            .into_iter()
            .filter(|name| name.ends_with(suffix) && name.len() > suffix.len())
            .collect()
    }))
}

/// Reads every `*<suffix>` file in `dir` keyed by the name without the suffix.
pub(crate) fn read_text_dir(
    fs: &dyn FileSystem,
    dir: &Path,
    suffix: &str,
) -> Result<Option<BTreeMap<String, String>>> {
    let Some(names) = list_files(fs, dir, suffix)? else {
        return Ok(None);
    };
    let mut files = BTreeMap::new();
    for name in names {
        if let Some(content) = read_text(fs, &dir.join(&name))? {
            let stem = name[..name.len() - suffix.len()].to_string();
            files.insert(stem, content);
        }
    }
    debug!(dir = %dir.display(), count = files.len(), "Read directory");
    Ok(Some(files))
}

/// Reads an MCP registry file, logging entries that could not be parsed.
pub(crate) fn read_mcp_registry(fs: &dyn FileSystem, path: &Path) -> Result<Option<Vec<McpServer>>> {
    let Some(doc) = read_json_lenient(fs, path)? else {
        return Ok(None);
    };
    let source = path.display().to_string();
    let (servers, warnings) = mcp::parse_registry(&doc, &source);
    for warning in warnings {
        warn!("{warning}");
    }
    Ok(Some(servers))
}

/// File name for a record name: path separators and leading dots are neutralised.
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

/// Plans a JSON file from any serializable value.
pub(crate) fn json_file(path: impl AsRef<Path>, value: &impl Serialize) -> Option<PlannedFile> {
    let path = path.as_ref();
    match serde_json::to_value(value) {
        Ok(value) => Some(PlannedFile::json(path, value)),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Could not serialize; skipping file");
            None
        }
    }
}

/// Every platform whose markers exist under `root`.
pub fn detect_platforms(fs: &dyn FileSystem, root: &Path) -> Vec<Platform> {
    Platform::ALL
        .into_iter()
        .filter(|platform| match platform {
            Platform::ClaudeCode => ClaudeCodeBuilder::new(fs).detect(root),
            Platform::Kiro => KiroBuilder::new(fs).detect(root),
            Platform::Cursor => CursorBuilder::new(fs).detect(root),
        })
        .collect()
}

/// Runs `platform`'s builder over `root`.
pub fn build_for(
    platform: Platform,
    fs: &dyn FileSystem,
    limits: &SizeLimits,
    root: &Path,
) -> Result<(TaptikContext, ValidationResult)> {
    match platform {
        Platform::ClaudeCode => ClaudeCodeBuilder::new(fs)
            .with_limits(*limits)
            .build_with_report(root),
        Platform::Kiro => KiroBuilder::new(fs)
            .with_limits(*limits)
            .build_with_report(root),
        Platform::Cursor => CursorBuilder::new(fs)
            .with_limits(*limits)
            .build_with_report(root),
    }
}

/// Neutral sections derived from one platform payload.
pub fn sections_for(config: &PlatformConfig) -> Sections {
    match config {
        PlatformConfig::ClaudeCode(c) => claude_code::sections(c),
        PlatformConfig::Kiro(c) => kiro::sections(c),
        PlatformConfig::Cursor(c) => cursor::sections(c),
    }
}

/// Native files `platform` would write for `context`.
pub fn render_for(
    platform: Platform,
    fs: &dyn FileSystem,
    context: &TaptikContext,
) -> Result<Converted<Vec<PlannedFile>>> {
    fn render<B: PlatformBuilder>(
        builder: B,
        context: &TaptikContext,
    ) -> Result<Converted<Vec<PlannedFile>>> {
        let converted = builder.convert(context)?;
        Ok(Converted {
            data: builder.render(&converted.data),
            warnings: converted.warnings,
        })
    }
    match platform {
        Platform::ClaudeCode => render(ClaudeCodeBuilder::new(fs), context),
        Platform::Kiro => render(KiroBuilder::new(fs), context),
        Platform::Cursor => render(CursorBuilder::new(fs), context),
    }
}
