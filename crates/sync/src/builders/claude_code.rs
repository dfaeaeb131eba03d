//! Claude Code builder for `CLAUDE.md`, `.claude/` and `.mcp.json`.

use super::checks::{check_content, check_json, check_mcp_servers, empty_configuration, require};
use super::merge::{merge_optional_named, merge_optional_settings, read_scopes};
use super::traits::{ConversionResult, Converted, PlatformBuilder, Sections};
use super::{json_file, read_json_object, read_mcp_registry, read_text, read_text_dir, safe_file_name};
use crate::writer::PlannedFile;
use crate::Result;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use taptik_core::{
    ClaudeCodeConfig, ClaudeSettings, FileSystem, McpServer, PersonalData, Platform,
    PlatformConfig, PlatformConfigRef, ProjectData, PromptTemplate, PromptsData, TaptikContext,
    TaptikError, ToolsData, ValidationResult, ValidationWarning,
};
use taptik_validate::{ContentBundle, ContentKind, SizeLimits};
use tracing::{debug, warn};

pub const MARKERS: &[&str] = &["CLAUDE.md", ".claude", ".mcp.json", "CLAUDE.local.md"];

/// Prompt category for slash commands.
pub const COMMAND_CATEGORY: &str = "command";
/// Prompt category for subagent definitions.
pub const AGENT_CATEGORY: &str = "agent";

/// Builder for Claude Code projects.
pub struct ClaudeCodeBuilder<'a> {
    fs: &'a dyn FileSystem,
    limits: SizeLimits,
}

impl<'a> ClaudeCodeBuilder<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            limits: SizeLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// `~/.claude`, when a home directory is known.
    fn user_root(&self) -> Option<PathBuf> {
        self.fs.user_home().map(|home| home.join(".claude"))
    }

    fn read_settings(&self, root: &Path) -> Result<Option<ClaudeSettings>> {
        let fs = self.fs;
        let workspace = root.join(".claude").join("settings.json");
        let user = self.user_root().map(|dir| dir.join("settings.json"));
        let (workspace, user) = read_scopes(
            || read_json_object(fs, &workspace),
            || user.as_deref().map_or(Ok(None), |p| read_json_object(fs, p)),
        );
        let Some(merged) = merge_optional_settings(workspace?, user?) else {
            return Ok(None);
        };
        match serde_json::from_value::<ClaudeSettings>(Value::Object(merged.clone())) {
            Ok(settings) => Ok(Some(settings)),
            Err(err) => {
                warn!(error = %err, "settings.json has unexpected field types; keeping keys untyped");
                Ok(Some(ClaudeSettings {
                    extra: merged,
                    ..Default::default()
                }))
            }
        }
    }

    fn read_mcp(&self, root: &Path) -> Result<Option<Vec<McpServer>>> {
        let fs = self.fs;
        let workspace = root.join(".mcp.json");
        let user = self.user_root().map(|dir| dir.join("mcp.json"));
        let (workspace, user) = read_scopes(
            || read_mcp_registry(fs, &workspace),
            || user.as_deref().map_or(Ok(None), |p| read_mcp_registry(fs, p)),
        );
        Ok(merge_optional_named(workspace?, user?, |s: &McpServer| {
            s.name.clone()
        }))
    }
}

impl PlatformBuilder for ClaudeCodeBuilder<'_> {
    type Raw = ClaudeCodeConfig;

    fn platform(&self) -> Platform {
        Platform::ClaudeCode
    }

    fn fs(&self) -> &dyn FileSystem {
        self.fs
    }

    fn limits(&self) -> &SizeLimits {
        &self.limits
    }

    fn markers(&self) -> &'static [&'static str] {
        MARKERS
    }

    fn extract(&self, root: &Path) -> Result<ClaudeCodeConfig> {
        self.require_detected(root)?;
        let config = ClaudeCodeConfig {
            settings: self.read_settings(root)?,
            mcp_servers: self.read_mcp(root)?,
            claude_md: read_text(self.fs, &root.join("CLAUDE.md"))?,
            claude_local_md: read_text(self.fs, &root.join("CLAUDE.local.md"))?,
            commands: read_text_dir(self.fs, &root.join(".claude").join("commands"), ".md")?,
            agents: read_text_dir(self.fs, &root.join(".claude").join("agents"), ".md")?,
        };
        debug!(root = %root.display(), empty = config.is_empty(), "Extracted Claude Code configuration");
        Ok(config)
    }

    fn sanitize(&self, mut raw: ClaudeCodeConfig) -> (ClaudeCodeConfig, Vec<ValidationWarning>) {
        let mut warnings = Vec::new();
        if let Some(servers) = raw.mcp_servers.take() {
            raw.mcp_servers = Some(drop_unnamed_servers(servers, "claude_code", &mut warnings));
        }
        (raw, warnings)
    }

    fn normalize(&self, raw: &ClaudeCodeConfig, name: &str) -> TaptikContext {
        sections(raw)
            .apply(
                TaptikContext::builder(name)
                    .platform_config(PlatformConfig::ClaudeCode(raw.clone())),
            )
            .build()
    }

    fn validate(&self, context: &TaptikContext) -> ValidationResult {
        let mut result = ValidationResult::new();
        match context.platform_config(Platform::ClaudeCode) {
            Some(PlatformConfigRef::ClaudeCode(config)) if !config.is_empty() => {
                check(config, &self.limits, &mut result);
            }
            _ => result.add_warning(empty_configuration(Platform::ClaudeCode)),
        }
        result
    }

    fn convert(&self, context: &TaptikContext) -> ConversionResult<ClaudeCodeConfig> {
        if let Some(PlatformConfigRef::ClaudeCode(config)) =
            context.platform_config(Platform::ClaudeCode)
        {
            if !config.is_empty() {
                return Ok(Converted::new(config.clone()));
            }
        }
        let config = from_sections(context);
        if config.is_empty() {
            return Err(TaptikError::NoSourceConfiguration {
                platform: Platform::ClaudeCode,
            });
        }
        Ok(Converted {
            data: config,
            warnings: vec![
                "no Claude Code payload in context; rebuilt from project, prompts, tools and personal sections"
                    .to_string(),
            ],
        })
    }

    fn render(&self, raw: &ClaudeCodeConfig) -> Vec<PlannedFile> {
        render(raw)
    }
}

/// Removes MCP servers without a name, one warning each.
pub(crate) fn drop_unnamed_servers(
    servers: Vec<McpServer>,
    scope: &str,
    warnings: &mut Vec<ValidationWarning>,
) -> Vec<McpServer> {
    servers
        .into_iter()
        .enumerate()
        .filter_map(|(i, server)| {
            if server.name.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    format!("{scope}.mcp_servers[{i}]"),
                    "skipped MCP server without a name",
                ));
                None
            } else {
                Some(server)
            }
        })
        .collect()
}

/// Platform-neutral sections carried by a Claude Code payload.
pub fn sections(config: &ClaudeCodeConfig) -> Sections {
    let project = config
        .claude_md
        .as_deref()
        .filter(|md| !md.trim().is_empty())
        .map(|md| ProjectData {
            description: first_heading(md),
            instructions: Some(md.to_string()),
            ..Default::default()
        });

    let mut templates = Vec::new();
    for (map, category) in [
        (&config.commands, COMMAND_CATEGORY),
        (&config.agents, AGENT_CATEGORY),
    ] {
        for (name, content) in map.iter().flatten() {
            templates.push(PromptTemplate {
                name: name.clone(),
                content: content.clone(),
                category: Some(category.to_string()),
            });
        }
    }
    let prompts = (!templates.is_empty()).then_some(PromptsData { templates });

    let tools = config
        .mcp_servers
        .as_ref()
        .filter(|servers| !servers.is_empty())
        .map(|servers| ToolsData {
            mcp_servers: servers.clone(),
            ..Default::default()
        });

    let mut preferences = Map::new();
    if let Some(settings) = &config.settings {
        if let Some(model) = &settings.model {
            preferences.insert("model".into(), json!(model));
        }
        if let Some(env) = settings.env.as_ref().filter(|env| !env.is_empty()) {
            preferences.insert("env".into(), json!(env));
        }
    }
    let personal = (!preferences.is_empty()).then_some(PersonalData { preferences });

    Sections {
        project,
        prompts,
        tools,
        personal,
    }
}

fn first_heading(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Rebuilds a payload from the platform-neutral sections of any context.
pub fn from_sections(context: &TaptikContext) -> ClaudeCodeConfig {
    let mut config = ClaudeCodeConfig {
        claude_md: context
            .project
            .as_ref()
            .and_then(|p| p.data.instructions.clone()),
        mcp_servers: context
            .tools
            .as_ref()
            .map(|t| t.data.mcp_servers.clone())
            .filter(|servers| !servers.is_empty()),
        ..Default::default()
    };

    if let Some(prompts) = &context.prompts {
        let mut commands = BTreeMap::new();
        let mut agents = BTreeMap::new();
        for template in &prompts.data.templates {
            let target = match template.category.as_deref() {
                Some(AGENT_CATEGORY) => &mut agents,
                _ => &mut commands,
            };
            target.insert(template.name.clone(), template.content.clone());
        }
        config.commands = (!commands.is_empty()).then_some(commands);
        config.agents = (!agents.is_empty()).then_some(agents);
    }

    if let Some(personal) = &context.personal {
        let prefs = &personal.data.preferences;
        let settings = ClaudeSettings {
            model: prefs.get("model").and_then(Value::as_str).map(str::to_string),
            env: prefs
                .get("env")
                .and_then(|env| serde_json::from_value(env.clone()).ok()),
            ..Default::default()
        };
        if !settings.is_empty() {
            config.settings = Some(settings);
        }
    }
    config
}

/// Structural, security and size checks for a Claude Code payload.
pub fn check(config: &ClaudeCodeConfig, limits: &SizeLimits, result: &mut ValidationResult) {
    if let Some(servers) = &config.mcp_servers {
        check_mcp_servers(result, "claude_code.mcp_servers", servers);
        for server in servers {
            if let Ok(value) = serde_json::to_value(server) {
                check_json(result, &value, &format!("claude_code.mcp_servers.{}", server.name));
            }
        }
    }
    if let Some(settings) = &config.settings {
        if let Some(hooks) = &settings.hooks {
            for (event, matchers) in hooks {
                for (i, matcher) in matchers.iter().enumerate() {
                    for (j, hook) in matcher.hooks.iter().enumerate() {
                        require(
                            result,
                            &format!("claude_code.settings.hooks.{event}[{i}].hooks[{j}].command"),
                            &hook.command,
                            "command",
                        );
                    }
                }
            }
        }
        if let Ok(value) = serde_json::to_value(settings) {
            check_json(result, &value, "claude_code.settings");
        }
    }

    let mut bundle = ContentBundle::new();
    if let Some(md) = &config.claude_md {
        bundle.push(ContentKind::Context, "CLAUDE.md", md);
    }
    if let Some(md) = &config.claude_local_md {
        bundle.push(ContentKind::Context, "CLAUDE.local.md", md);
    }
    for (name, body) in config.commands.iter().flatten() {
        bundle.push(ContentKind::Rule, format!("commands/{name}"), body);
    }
    for (name, body) in config.agents.iter().flatten() {
        bundle.push(ContentKind::Context, format!("agents/{name}"), body);
    }
    check_content(result, &bundle, limits);
}

/// Native files for a Claude Code payload.
pub fn render(config: &ClaudeCodeConfig) -> Vec<PlannedFile> {
    let mut files = Vec::new();
    if let Some(settings) = &config.settings {
        files.extend(json_file(".claude/settings.json", settings));
    }
    if let Some(servers) = &config.mcp_servers {
        files.push(PlannedFile::json(
            ".mcp.json",
            super::mcp::render_registry(servers),
        ));
    }
    if let Some(md) = &config.claude_md {
        files.push(PlannedFile::text("CLAUDE.md", md.clone()));
    }
    if let Some(md) = &config.claude_local_md {
        files.push(PlannedFile::text("CLAUDE.local.md", md.clone()));
    }
    for (dir, map) in [("commands", &config.commands), ("agents", &config.agents)] {
        for (name, body) in map.iter().flatten() {
            let path = Path::new(".claude")
                .join(dir)
                .join(format!("{}.md", safe_file_name(name)));
            files.push(PlannedFile::text(path, body.clone()));
        }
    }
    files
}
