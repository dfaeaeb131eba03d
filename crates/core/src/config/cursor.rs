//! Cursor configuration payload.

use super::mcp::McpServer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Configuration carried in `ide.cursor`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CursorConfig {
    /// Editor settings in nested form; the on-disk file uses dotted keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    /// Project rules (`.cursor/rules/*.mdc`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<CursorRule>>,
    /// Legacy single-file rules (`.cursorrules`).
    #[serde(default, alias = "legacyRules", skip_serializing_if = "Option::is_none")]
    pub legacy_rules: Option<String>,
    #[serde(default, alias = "mcpServers", skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServer>>,
    /// Recommended extension ids (`.vscode/extensions.json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    /// Snippet files keyed by file stem (`.vscode/<name>.code-snippets`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippets: Option<BTreeMap<String, Value>>,
    /// `.vscode/tasks.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Value>,
    /// `.vscode/launch.json` debug profiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch: Option<Value>,
}

impl CursorConfig {
    pub fn is_empty(&self) -> bool {
        self.settings.as_ref().is_none_or(Map::is_empty)
            && self.rules.as_ref().is_none_or(Vec::is_empty)
            && self.legacy_rules.as_deref().is_none_or(str::is_empty)
            && self.mcp_servers.as_ref().is_none_or(Vec::is_empty)
            && self.extensions.as_ref().is_none_or(Vec::is_empty)
            && self.snippets.as_ref().is_none_or(BTreeMap::is_empty)
            && self.tasks.is_none()
            && self.launch.is_none()
    }
}

/// A rule file with `.mdc` frontmatter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CursorRule {
    #[serde(default)]
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub globs: Vec<String>,
    #[serde(default, alias = "alwaysApply")]
    pub always_apply: bool,
}
