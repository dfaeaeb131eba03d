//! Kiro configuration payload.

use super::mcp::McpServer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration carried in `ide.kiro`.
///
/// Every collection is an `Option`: `Some(vec![])` means the directory exists but
/// is empty, `None` means the project never declared it. Both states survive
/// serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KiroConfig {
    /// Relative location of the spec documents (usually `.kiro/specs`).
    #[serde(default, alias = "specsPath", skip_serializing_if = "Option::is_none")]
    pub specs_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<Vec<KiroSpec>>,
    #[serde(default, alias = "steeringRules", skip_serializing_if = "Option::is_none")]
    pub steering_rules: Option<Vec<SteeringRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Vec<KiroHook>>,
    #[serde(default, alias = "mcpServers", skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServer>>,
    #[serde(default, alias = "taskTemplates", skip_serializing_if = "Option::is_none")]
    pub task_templates: Option<Vec<TaskTemplate>>,
    /// Merged `.kiro/settings/settings.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    /// `.kiro/settings/project.json`.
    #[serde(default, alias = "projectSettings", skip_serializing_if = "Option::is_none")]
    pub project_settings: Option<Map<String, Value>>,
}

impl KiroConfig {
    pub fn is_empty(&self) -> bool {
        self.specs_path.is_none()
            && self.specs.as_ref().is_none_or(Vec::is_empty)
            && self.steering_rules.as_ref().is_none_or(Vec::is_empty)
            && self.hooks.as_ref().is_none_or(Vec::is_empty)
            && self.mcp_servers.as_ref().is_none_or(Vec::is_empty)
            && self.task_templates.as_ref().is_none_or(Vec::is_empty)
            && self.settings.as_ref().is_none_or(Map::is_empty)
            && self.project_settings.as_ref().is_none_or(Map::is_empty)
    }
}

/// When a steering document is pulled into the agent's context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SteeringInclusion {
    #[default]
    Always,
    FileMatch,
    Manual,
}

impl SteeringInclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::FileMatch => "fileMatch",
            Self::Manual => "manual",
        }
    }

    /// Parses the frontmatter value; unknown values fall back to `Always`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "fileMatch" | "file_match" | "filematch" => Self::FileMatch,
            "manual" => Self::Manual,
            _ => Self::Always,
        }
    }
}

/// A markdown steering document under `.kiro/steering/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SteeringRule {
    #[serde(default)]
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub inclusion: SteeringInclusion,
    #[serde(default, alias = "fileMatchPattern", skip_serializing_if = "Option::is_none")]
    pub file_match_pattern: Option<String>,
}

/// A spec folder: `.kiro/specs/<name>/{requirements,design,tasks}.md`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KiroSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<String>,
}

/// An agent hook (`.kiro/hooks/<name>.kiro.hook`).
///
/// `name` and `version` default to empty so unnamed hooks can be reported and
/// filtered instead of failing the whole extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KiroHook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub when: HookTrigger,
    #[serde(default)]
    pub then: HookAction,
}

fn default_true() -> bool {
    true
}

impl KiroHook {
    /// Name used for deduplication: explicit id when present, otherwise name.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HookTrigger {
    #[serde(rename = "type", default)]
    pub event: HookEvent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookEvent {
    FileEdited,
    FileCreated,
    FileDeleted,
    #[default]
    UserTriggered,
    PromptSubmit,
    AgentStop,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileEdited => "fileEdited",
            Self::FileCreated => "fileCreated",
            Self::FileDeleted => "fileDeleted",
            Self::UserTriggered => "userTriggered",
            Self::PromptSubmit => "promptSubmit",
            Self::AgentStop => "agentStop",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HookAction {
    #[serde(rename = "type", default)]
    pub kind: HookActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookActionKind {
    #[default]
    AskAgent,
    RunCommand,
}

/// A reusable task template (`.kiro/templates/<id>.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskTemplate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
}
