//! Claude Code configuration payload.

use super::mcp::McpServer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Configuration carried in `ide.claude_code`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClaudeCodeConfig {
    /// Merged `.claude/settings.json` contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ClaudeSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServer>>,
    /// Project instructions (`CLAUDE.md`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_md: Option<String>,
    /// Personal, uncommitted instructions (`CLAUDE.local.md`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_local_md: Option<String>,
    /// Slash commands keyed by name (`.claude/commands/<name>.md`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<BTreeMap<String, String>>,
    /// Subagent definitions keyed by name (`.claude/agents/<name>.md`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<BTreeMap<String, String>>,
}

impl ClaudeCodeConfig {
    /// True when no sub-field carries data.
    pub fn is_empty(&self) -> bool {
        self.settings.as_ref().is_none_or(ClaudeSettings::is_empty)
            && self.mcp_servers.as_ref().is_none_or(Vec::is_empty)
            && self.claude_md.as_deref().is_none_or(str::is_empty)
            && self.claude_local_md.as_deref().is_none_or(str::is_empty)
            && self.commands.as_ref().is_none_or(BTreeMap::is_empty)
            && self.agents.as_ref().is_none_or(BTreeMap::is_empty)
    }
}

/// Typed view over `settings.json`. Keys without a typed field survive in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClaudeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<ClaudePermissions>,
    /// Hook matchers keyed by event (`PreToolUse`, `PostToolUse`, `Stop`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<BTreeMap<String, Vec<ClaudeHookMatcher>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClaudeSettings {
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.permissions.is_none()
            && self.hooks.as_ref().is_none_or(BTreeMap::is_empty)
            && self.env.as_ref().is_none_or(BTreeMap::is_empty)
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaudePermissions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deny: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<String>,
}

/// One `{matcher, hooks: [...]}` entry under a hook event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClaudeHookMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    #[serde(default)]
    pub hooks: Vec<ClaudeHookCommand>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaudeHookCommand {
    #[serde(rename = "type", default = "default_hook_type")]
    pub kind: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_hook_type() -> String {
    "command".to_string()
}

impl ClaudeHookCommand {
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            kind: default_hook_type(),
            command: command.into(),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_keep_unknown_keys() {
        let raw = json!({
            "model": "claude-sonnet-4",
            "statusLine": {"type": "command", "command": "echo hi"},
            "permissions": {"allow": ["Bash(npm test)"], "defaultMode": "acceptEdits"}
        });
        let settings: ClaudeSettings = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(settings.model.as_deref(), Some("claude-sonnet-4"));
        assert!(settings.extra.contains_key("statusLine"));
        assert_eq!(
            settings.permissions.as_ref().unwrap().default_mode.as_deref(),
            Some("acceptEdits")
        );
        assert_eq!(serde_json::to_value(&settings).unwrap(), raw);
    }

    #[test]
    fn test_hooks_shape() {
        let raw = json!({
            "hooks": {
                "PostToolUse": [
                    {"matcher": "Edit|Write", "hooks": [{"type": "command", "command": "cargo fmt"}]}
                ]
            }
        });
        let settings: ClaudeSettings = serde_json::from_value(raw).unwrap();
        let hooks = settings.hooks.unwrap();
        assert_eq!(hooks["PostToolUse"][0].hooks[0].command, "cargo fmt");
    }

    #[test]
    fn test_is_empty() {
        assert!(ClaudeCodeConfig::default().is_empty());
        let config = ClaudeCodeConfig {
            claude_md: Some("# Rules".into()),
            ..Default::default()
        };
        assert!(!config.is_empty());
    }
}
