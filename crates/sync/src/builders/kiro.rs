//! Kiro builder for `.kiro/` (steering, specs, hooks, settings, templates).

use super::checks::{check_content, check_json, check_mcp_servers, empty_configuration, require};
use super::claude_code::drop_unnamed_servers;
use super::frontmatter::{parse_frontmatter, render_frontmatter};
use super::merge::{merge_optional_named, merge_optional_settings, read_scopes};
use super::traits::{ConversionResult, Converted, PlatformBuilder, Sections};
use super::{
    json_file, list_files, read_json_lenient, read_json_object, read_mcp_registry, read_text,
    safe_file_name,
};
use crate::writer::PlannedFile;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use taptik_core::fs::list_optional;
use taptik_core::{
    FileSystem, HookActionKind, KiroConfig, KiroHook, KiroSpec, McpServer, PersonalData,
    Platform, PlatformConfig, PlatformConfigRef, ProjectData, PromptTemplate, PromptsData,
    SteeringInclusion, SteeringRule, TaptikContext, TaptikError, TaskTemplate, ToolsData,
    ValidationResult, ValidationWarning,
};
use taptik_validate::{ContentBundle, ContentKind, SizeLimits};
use tracing::{debug, warn};

pub const MARKERS: &[&str] = &[
    ".kiro",
    ".kiro/steering",
    ".kiro/specs",
    ".kiro/settings",
    ".kiro/hooks",
];

/// Default location of spec folders.
pub const SPECS_PATH: &str = ".kiro/specs";
const HOOK_SUFFIX: &str = ".kiro.hook";
const SPEC_DOCUMENTS: [&str; 3] = ["requirements", "design", "tasks"];

/// Prompt category for `askAgent` hook prompts.
pub const HOOK_CATEGORY: &str = "hook";
/// Prompt category for task templates.
pub const TEMPLATE_CATEGORY: &str = "template";

/// Steering document frontmatter.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SteeringMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inclusion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_match_pattern: Option<String>,
}

/// Builder for Kiro projects.
pub struct KiroBuilder<'a> {
    fs: &'a dyn FileSystem,
    limits: SizeLimits,
}

impl<'a> KiroBuilder<'a> {
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

    /// `~/.kiro`, when a home directory is known.
    fn user_root(&self) -> Option<PathBuf> {
        self.fs.user_home().map(|home| home.join(".kiro"))
    }

    fn read_settings(&self, root: &Path) -> Result<Option<Map<String, Value>>> {
        let fs = self.fs;
        let workspace = root.join(".kiro/settings/settings.json");
        let user = self.user_root().map(|dir| dir.join("settings/settings.json"));
        let (workspace, user) = read_scopes(
            || read_json_object(fs, &workspace),
            || user.as_deref().map_or(Ok(None), |p| read_json_object(fs, p)),
        );
        Ok(merge_optional_settings(workspace?, user?))
    }

    fn read_mcp(&self, root: &Path) -> Result<Option<Vec<McpServer>>> {
        let fs = self.fs;
        let workspace = root.join(".kiro/settings/mcp.json");
        let user = self.user_root().map(|dir| dir.join("settings/mcp.json"));
        let (workspace, user) = read_scopes(
            || read_mcp_registry(fs, &workspace),
            || user.as_deref().map_or(Ok(None), |p| read_mcp_registry(fs, p)),
        );
        Ok(merge_optional_named(workspace?, user?, |s: &McpServer| {
            s.name.clone()
        }))
    }

    fn read_hooks(&self, root: &Path) -> Result<Option<Vec<KiroHook>>> {
        let fs = self.fs;
        let workspace = root.join(".kiro/hooks");
        let user = self.user_root().map(|dir| dir.join("hooks"));
        let (workspace, user) = read_scopes(
            || read_hook_dir(fs, &workspace),
            || user.as_deref().map_or(Ok(None), |p| read_hook_dir(fs, p)),
        );
        Ok(merge_optional_named(workspace?, user?, |h: &KiroHook| {
            h.key().to_string()
        }))
    }

    fn read_steering(&self, root: &Path) -> Result<Option<Vec<SteeringRule>>> {
        let dir = root.join(".kiro/steering");
        let Some(names) = list_files(self.fs, &dir, ".md")? else {
            return Ok(None);
        };
        let mut rules = Vec::with_capacity(names.len());
        for file in names {
            let path = dir.join(&file);
            let Some(content) = read_text(self.fs, &path)? else {
                continue;
            };
            let (meta, body) = parse_frontmatter::<SteeringMeta>(&content, &file);
            rules.push(SteeringRule {
                name: file.trim_end_matches(".md").to_string(),
                content: body,
                inclusion: meta
                    .inclusion
                    .as_deref()
                    .map(SteeringInclusion::parse)
                    .unwrap_or_default(),
                file_match_pattern: meta.file_match_pattern,
            });
        }
        Ok(Some(rules))
    }

    fn read_specs(&self, root: &Path) -> Result<Option<Vec<KiroSpec>>> {
        let dir = root.join(SPECS_PATH);
        let Some(entries) =
            list_optional(self.fs, &dir).map_err(|e| TaptikError::file_operation("list", e))?
        else {
            return Ok(None);
        };
        let mut specs = Vec::new();
        for name in entries {
            let spec_dir = dir.join(&name);
            if !self
                .fs
                .is_directory(&spec_dir)
                .map_err(|e| TaptikError::file_operation("inspect", e))?
            {
                continue;
            }
            let [requirements, design, tasks] = SPEC_DOCUMENTS
                .map(|doc| read_text(self.fs, &spec_dir.join(format!("{doc}.md"))));
            specs.push(KiroSpec {
                name,
                requirements: requirements?,
                design: design?,
                tasks: tasks?,
            });
        }
        Ok(Some(specs))
    }

    fn read_templates(&self, root: &Path) -> Result<Option<Vec<TaskTemplate>>> {
        let dir = root.join(".kiro/templates");
        let Some(names) = list_files(self.fs, &dir, ".json")? else {
            return Ok(None);
        };
        let mut templates = Vec::new();
        for file in names {
            let Some(value) = read_json_lenient(self.fs, &dir.join(&file))? else {
                continue;
            };
            match serde_json::from_value::<TaskTemplate>(value) {
                Ok(mut template) => {
                    if template.id.is_empty() {
                        template.id = file.trim_end_matches(".json").to_string();
                    }
                    templates.push(template);
                }
                Err(err) => warn!(file = %file, error = %err, "Skipping malformed task template"),
            }
        }
        Ok(Some(templates))
    }
}

fn read_hook_dir(fs: &dyn FileSystem, dir: &Path) -> Result<Option<Vec<KiroHook>>> {
    let Some(names) = list_files(fs, dir, HOOK_SUFFIX)? else {
        return Ok(None);
    };
    let mut hooks = Vec::new();
    for file in names {
        let Some(value) = read_json_lenient(fs, &dir.join(&file))? else {
            continue;
        };
        match serde_json::from_value::<KiroHook>(value) {
            Ok(hook) => hooks.push(hook),
            Err(err) => warn!(file = %file, error = %err, "Skipping malformed hook"),
        }
    }
    Ok(Some(hooks))
}

impl PlatformBuilder for KiroBuilder<'_> {
    type Raw = KiroConfig;

    fn platform(&self) -> Platform {
        Platform::Kiro
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

    fn extract(&self, root: &Path) -> Result<KiroConfig> {
        self.require_detected(root)?;
        let specs = self.read_specs(root)?;
        let config = KiroConfig {
            specs_path: specs.as_ref().map(|_| SPECS_PATH.to_string()),
            specs,
            steering_rules: self.read_steering(root)?,
            hooks: self.read_hooks(root)?,
            mcp_servers: self.read_mcp(root)?,
            task_templates: self.read_templates(root)?,
            settings: self.read_settings(root)?,
            project_settings: read_json_object(self.fs, &root.join(".kiro/settings/project.json"))?,
        };
        debug!(root = %root.display(), empty = config.is_empty(), "Extracted Kiro configuration");
        Ok(config)
    }

    fn sanitize(&self, mut raw: KiroConfig) -> (KiroConfig, Vec<ValidationWarning>) {
        let mut warnings = Vec::new();
        if let Some(hooks) = raw.hooks.take() {
            let mut kept = Vec::with_capacity(hooks.len());
            for (i, hook) in hooks.into_iter().enumerate() {
                if hook.name.trim().is_empty() {
                    warnings.push(ValidationWarning::new(
                        format!("kiro.hooks[{i}]"),
                        "skipped hook without a name",
                    ));
                } else {
                    kept.push(hook);
                }
            }
            raw.hooks = Some(kept);
        }
        if let Some(rules) = raw.steering_rules.take() {
            let mut kept = Vec::with_capacity(rules.len());
            for (i, rule) in rules.into_iter().enumerate() {
                if rule.name.trim().is_empty() {
                    warnings.push(ValidationWarning::new(
                        format!("kiro.steering_rules[{i}]"),
                        "skipped steering rule without a name",
                    ));
                } else {
                    kept.push(rule);
                }
            }
            raw.steering_rules = Some(kept);
        }
        if let Some(servers) = raw.mcp_servers.take() {
            raw.mcp_servers = Some(drop_unnamed_servers(servers, "kiro", &mut warnings));
        }
        (raw, warnings)
    }

    fn normalize(&self, raw: &KiroConfig, name: &str) -> TaptikContext {
        sections(raw)
            .apply(TaptikContext::builder(name).platform_config(PlatformConfig::Kiro(raw.clone())))
            .build()
    }

    fn validate(&self, context: &TaptikContext) -> ValidationResult {
        let mut result = ValidationResult::new();
        match context.platform_config(Platform::Kiro) {
            Some(PlatformConfigRef::Kiro(config)) if !config.is_empty() => {
                check(config, &self.limits, &mut result);
            }
            _ => result.add_warning(empty_configuration(Platform::Kiro)),
        }
        result
    }

    fn convert(&self, context: &TaptikContext) -> ConversionResult<KiroConfig> {
        if let Some(PlatformConfigRef::Kiro(config)) = context.platform_config(Platform::Kiro) {
            if !config.is_empty() {
                return Ok(Converted::new(config.clone()));
            }
        }
        let config = from_sections(context);
        if config.is_empty() {
            return Err(TaptikError::NoSourceConfiguration {
                platform: Platform::Kiro,
            });
        }
        Ok(Converted {
            data: config,
            warnings: vec![
                "no Kiro payload in context; rebuilt steering rules and MCP servers from the neutral sections"
                    .to_string(),
            ],
        })
    }

    fn render(&self, raw: &KiroConfig) -> Vec<PlannedFile> {
        render(raw)
    }
}

/// Platform-neutral sections carried by a Kiro payload.
///
/// `project` is present only when there are steering rules or project
/// settings; an empty steering directory alone does not create it.
pub fn sections(config: &KiroConfig) -> Sections {
    let steering = config.steering_rules.as_deref().unwrap_or_default();
    let project = if !steering.is_empty() || config.project_settings.is_some() {
        let settings = config.project_settings.clone().unwrap_or_default();
        let text = |key: &str| settings.get(key).and_then(Value::as_str).map(str::to_string);
        let always: Vec<&str> = steering
            .iter()
            .filter(|r| r.inclusion == SteeringInclusion::Always)
            .map(|r| r.content.as_str())
            .collect();
        Some(ProjectData {
            name: text("name"),
            description: text("description"),
            instructions: (!always.is_empty()).then(|| always.join("\n\n")),
            conventions: steering.iter().map(|r| r.name.clone()).collect(),
            custom: settings,
        })
    } else {
        None
    };

    let mut templates = Vec::new();
    for hook in config.hooks.iter().flatten() {
        if hook.then.kind != HookActionKind::AskAgent {
            continue;
        }
        if let Some(prompt) = hook.then.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            templates.push(PromptTemplate {
                name: hook.name.clone(),
                content: prompt.to_string(),
                category: Some(HOOK_CATEGORY.to_string()),
            });
        }
    }
    for template in config.task_templates.iter().flatten() {
        templates.push(PromptTemplate {
            name: template.id.clone(),
            content: template_body(template),
            category: Some(TEMPLATE_CATEGORY.to_string()),
        });
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

    let personal = config
        .settings
        .as_ref()
        .filter(|settings| !settings.is_empty())
        .map(|settings| PersonalData {
            preferences: settings.clone(),
        });

    Sections {
        project,
        prompts,
        tools,
        personal,
    }
}

fn template_body(template: &TaskTemplate) -> String {
    let mut body = template.description.clone().unwrap_or_default();
    for step in &template.steps {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str("- ");
        body.push_str(step);
    }
    body
}

/// Rebuilds a payload from the platform-neutral sections of any context.
pub fn from_sections(context: &TaptikContext) -> KiroConfig {
    let mut config = KiroConfig::default();
    if let Some(instructions) = context
        .project
        .as_ref()
        .and_then(|p| p.data.instructions.as_deref())
        .filter(|text| !text.trim().is_empty())
    {
        config.steering_rules = Some(vec![SteeringRule {
            name: "project".into(),
            content: instructions.to_string(),
            inclusion: SteeringInclusion::Always,
            file_match_pattern: None,
        }]);
    }
    config.mcp_servers = context
        .tools
        .as_ref()
        .map(|t| t.data.mcp_servers.clone())
        .filter(|servers| !servers.is_empty());
    config.settings = context
        .personal
        .as_ref()
        .map(|p| p.data.preferences.clone())
        .filter(|prefs| !prefs.is_empty());
    config
}

/// Structural, security and size checks for a Kiro payload.
pub fn check(config: &KiroConfig, limits: &SizeLimits, result: &mut ValidationResult) {
    for (i, hook) in config.hooks.iter().flatten().enumerate() {
        require(result, &format!("kiro.hooks[{i}].name"), &hook.name, "name");
        require(result, &format!("kiro.hooks[{i}].version"), &hook.version, "version");
    }
    for (i, rule) in config.steering_rules.iter().flatten().enumerate() {
        require(result, &format!("kiro.steering_rules[{i}].name"), &rule.name, "name");
    }
    if let Some(servers) = &config.mcp_servers {
        check_mcp_servers(result, "kiro.mcp_servers", servers);
        for server in servers {
            if let Ok(value) = serde_json::to_value(server) {
                check_json(result, &value, &format!("kiro.mcp_servers.{}", server.name));
            }
        }
    }
    if let Some(settings) = &config.settings {
        check_json(result, &Value::Object(settings.clone()), "kiro.settings");
    }
    if let Some(settings) = &config.project_settings {
        check_json(result, &Value::Object(settings.clone()), "kiro.project_settings");
    }

    let mut bundle = ContentBundle::new();
    for rule in config.steering_rules.iter().flatten() {
        bundle.push(ContentKind::Rule, format!("steering/{}", rule.name), &rule.content);
    }
    for spec in config.specs.iter().flatten() {
        for (doc, body) in [
            ("requirements", &spec.requirements),
            ("design", &spec.design),
            ("tasks", &spec.tasks),
        ] {
            if let Some(body) = body {
                bundle.push(ContentKind::Context, format!("specs/{}/{doc}.md", spec.name), body);
            }
        }
    }
    for hook in config.hooks.iter().flatten() {
        let body = hook.then.prompt.as_ref().or(hook.then.command.as_ref());
        if let Some(body) = body {
            bundle.push(ContentKind::Prompt, format!("hooks/{}", hook.key()), body);
        }
    }
    for template in config.task_templates.iter().flatten() {
        bundle.push(
            ContentKind::Prompt,
            format!("templates/{}", template.id),
            template_body(template),
        );
    }
    check_content(result, &bundle, limits);
}

/// Native files for a Kiro payload.
pub fn render(config: &KiroConfig) -> Vec<PlannedFile> {
    let mut files = Vec::new();
    for rule in config.steering_rules.iter().flatten() {
        let meta = SteeringMeta {
            inclusion: Some(rule.inclusion.as_str().to_string()),
            file_match_pattern: rule.file_match_pattern.clone(),
        };
        files.push(PlannedFile::text(
            Path::new(".kiro/steering").join(format!("{}.md", safe_file_name(&rule.name))),
            render_frontmatter(&meta, &rule.content),
        ));
    }
    for spec in config.specs.iter().flatten() {
        let dir = Path::new(SPECS_PATH).join(safe_file_name(&spec.name));
        for (doc, body) in [
            ("requirements", &spec.requirements),
            ("design", &spec.design),
            ("tasks", &spec.tasks),
        ] {
            if let Some(body) = body {
                files.push(PlannedFile::text(dir.join(format!("{doc}.md")), body.clone()));
            }
        }
    }
    for hook in config.hooks.iter().flatten() {
        let path = Path::new(".kiro/hooks")
            .join(format!("{}{HOOK_SUFFIX}", safe_file_name(hook.key())));
        files.extend(json_file(path, hook));
    }
    for template in config.task_templates.iter().flatten() {
        let path = Path::new(".kiro/templates")
            .join(format!("{}.json", safe_file_name(&template.id)));
        files.extend(json_file(path, template));
    }
    if let Some(settings) = &config.settings {
        files.push(PlannedFile::json(
            ".kiro/settings/settings.json",
            Value::Object(settings.clone()),
        ));
    }
    if let Some(servers) = &config.mcp_servers {
        files.push(PlannedFile::json(
            ".kiro/settings/mcp.json",
            super::mcp::render_registry(servers),
        ));
    }
    if let Some(settings) = &config.project_settings {
        files.push(PlannedFile::json(
            ".kiro/settings/project.json",
            Value::Object(settings.clone()),
        ));
    }
    files
}
