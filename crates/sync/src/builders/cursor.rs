//! Cursor builder for `.cursor/`, `.cursorrules` and the `.vscode/` files Cursor reads.

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
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use taptik_core::{
    CursorConfig, CursorRule, FileSystem, McpServer, PersonalData, Platform, PlatformConfig,
    PlatformConfigRef, ProjectData, TaptikContext, TaptikError, ToolsData, ValidationResult,
    ValidationWarning,
};
use taptik_validate::{ContentBundle, ContentKind, SizeLimits};
use tracing::debug;

pub const MARKERS: &[&str] = &[".cursor", ".cursorrules", ".cursor/rules"];

const SNIPPET_SUFFIX: &str = ".code-snippets";

/// `.mdc` rule frontmatter as Cursor writes it.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Either a comma-separated string or a list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    globs: Option<serde_yaml::Value>,
    #[serde(default)]
    always_apply: bool,
}

fn parse_globs(value: Option<serde_yaml::Value>) -> Vec<String> {
    let split = |s: &str| {
        s.split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    match value {
        Some(serde_yaml::Value::String(s)) => split(&s),
        Some(serde_yaml::Value::Sequence(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .flat_map(split)
            .collect(),
        _ => Vec::new(),
    }
}

/// Expands dotted keys one level: `{"editor.fontSize": 14}` becomes
/// `{"editor": {"fontSize": 14}}`.
///
/// Only the first dot splits. Language overrides (`[rust]`) and keys
/// without a dot are kept as they are.
pub fn unflatten_settings(flat: Map<String, Value>) -> Map<String, Value> {
    let mut nested = Map::new();
    for (key, value) in flat {
        let split = match key.split_once('.') {
            Some((head, rest)) if !key.starts_with('[') && !head.is_empty() && !rest.is_empty() => {
                Some((head.to_string(), rest.to_string()))
            }
            _ => None,
        };
        let Some((head, rest)) = split else {
            nested.insert(key, value);
            continue;
        };
        if nested.get(&head).is_some_and(|existing| !existing.is_object()) {
            nested.insert(key, value);
        } else if let Value::Object(group) = nested.entry(head).or_insert_with(|| json!({})) {
            group.insert(rest, value);
        }
    }
    nested
}

/// Inverse of [`unflatten_settings`]: collapses one level of nesting into dotted keys.
pub fn flatten_settings(nested: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    for (key, value) in nested {
        match value {
            Value::Object(group) if !key.starts_with('[') && !group.is_empty() => {
                for (rest, inner) in group {
                    flat.insert(format!("{key}.{rest}"), inner.clone());
                }
            }
            _ => {
                flat.insert(key.clone(), value.clone());
            }
        }
    }
    flat
}

/// Builder for Cursor projects.
pub struct CursorBuilder<'a> {
    fs: &'a dyn FileSystem,
    limits: SizeLimits,
}

impl<'a> CursorBuilder<'a> {
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

    /// `~/.cursor`, when a home directory is known.
    fn user_root(&self) -> Option<PathBuf> {
        self.fs.user_home().map(|home| home.join(".cursor"))
    }

    fn read_settings(&self, root: &Path) -> Result<Option<Map<String, Value>>> {
        let fs = self.fs;
        let workspace = root.join(".vscode/settings.json");
        let user = self.user_root().map(|dir| dir.join("User/settings.json"));
        let (workspace, user) = read_scopes(
            || read_json_object(fs, &workspace),
            || user.as_deref().map_or(Ok(None), |p| read_json_object(fs, p)),
        );
        Ok(merge_optional_settings(
            workspace?.map(unflatten_settings),
            user?.map(unflatten_settings),
        ))
    }

    fn read_mcp(&self, root: &Path) -> Result<Option<Vec<McpServer>>> {
        let fs = self.fs;
        let workspace = root.join(".cursor/mcp.json");
        let user = self.user_root().map(|dir| dir.join("mcp.json"));
        let (workspace, user) = read_scopes(
            || read_mcp_registry(fs, &workspace),
            || user.as_deref().map_or(Ok(None), |p| read_mcp_registry(fs, p)),
        );
        Ok(merge_optional_named(workspace?, user?, |s: &McpServer| {
            s.name.clone()
        }))
    }

    fn read_rules(&self, root: &Path) -> Result<Option<Vec<CursorRule>>> {
        let dir = root.join(".cursor/rules");
        let Some(names) = list_files(self.fs, &dir, ".mdc")? else {
            return Ok(None);
        };
        let mut rules = Vec::with_capacity(names.len());
        for file in names {
            let Some(content) = read_text(self.fs, &dir.join(&file))? else {
                continue;
            };
            let (meta, body) = parse_frontmatter::<RuleMeta>(&content, &file);
            rules.push(CursorRule {
                name: file.trim_end_matches(".mdc").to_string(),
                content: body,
                description: meta.description,
                globs: parse_globs(meta.globs),
                always_apply: meta.always_apply,
            });
        }
        Ok(Some(rules))
    }

    fn read_extensions(&self, root: &Path) -> Result<Option<Vec<String>>> {
        let doc = read_json_lenient(self.fs, &root.join(".vscode/extensions.json"))?;
        Ok(doc.map(|doc| {
            doc.get("recommendations")
                .and_then(Value::as_array)
                .map(|ids| {
                    ids.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    fn read_snippets(&self, root: &Path) -> Result<Option<BTreeMap<String, Value>>> {
        let dir = root.join(".vscode");
        let Some(names) = list_files(self.fs, &dir, SNIPPET_SUFFIX)? else {
            return Ok(None);
        };
        if names.is_empty() {
            return Ok(None);
        }
        let mut snippets = BTreeMap::new();
        for file in names {
            if let Some(value) = read_json_lenient(self.fs, &dir.join(&file))? {
                snippets.insert(file.trim_end_matches(SNIPPET_SUFFIX).to_string(), value);
            }
        }
        Ok(Some(snippets))
    }
}

impl PlatformBuilder for CursorBuilder<'_> {
    type Raw = CursorConfig;

    fn platform(&self) -> Platform {
        Platform::Cursor
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

    fn extract(&self, root: &Path) -> Result<CursorConfig> {
        self.require_detected(root)?;
        let config = CursorConfig {
            settings: self.read_settings(root)?,
            rules: self.read_rules(root)?,
            legacy_rules: read_text(self.fs, &root.join(".cursorrules"))?,
            mcp_servers: self.read_mcp(root)?,
            extensions: self.read_extensions(root)?,
            snippets: self.read_snippets(root)?,
            tasks: read_json_lenient(self.fs, &root.join(".vscode/tasks.json"))?,
            launch: read_json_lenient(self.fs, &root.join(".vscode/launch.json"))?,
        };
        debug!(root = %root.display(), empty = config.is_empty(), "Extracted Cursor configuration");
        Ok(config)
    }

    fn sanitize(&self, mut raw: CursorConfig) -> (CursorConfig, Vec<ValidationWarning>) {
        let mut warnings = Vec::new();
        if let Some(rules) = raw.rules.take() {
            let mut kept = Vec::with_capacity(rules.len());
            for (i, rule) in rules.into_iter().enumerate() {
                if rule.name.trim().is_empty() {
                    warnings.push(ValidationWarning::new(
                        format!("cursor.rules[{i}]"),
                        "skipped rule without a name",
                    ));
                } else {
                    kept.push(rule);
                }
            }
            raw.rules = Some(kept);
        }
        if let Some(servers) = raw.mcp_servers.take() {
            raw.mcp_servers = Some(drop_unnamed_servers(servers, "cursor", &mut warnings));
        }
        (raw, warnings)
    }

    fn normalize(&self, raw: &CursorConfig, name: &str) -> TaptikContext {
        sections(raw)
            .apply(TaptikContext::builder(name).platform_config(PlatformConfig::Cursor(raw.clone())))
            .build()
    }

    fn validate(&self, context: &TaptikContext) -> ValidationResult {
        let mut result = ValidationResult::new();
        match context.platform_config(Platform::Cursor) {
            Some(PlatformConfigRef::Cursor(config)) if !config.is_empty() => {
                check(config, &self.limits, &mut result);
            }
            _ => result.add_warning(empty_configuration(Platform::Cursor)),
        }
        result
    }

    fn convert(&self, context: &TaptikContext) -> ConversionResult<CursorConfig> {
        if let Some(PlatformConfigRef::Cursor(config)) = context.platform_config(Platform::Cursor) {
            if !config.is_empty() {
                return Ok(Converted::new(config.clone()));
            }
        }
        let config = from_sections(context);
        if config.is_empty() {
            return Err(TaptikError::NoSourceConfiguration {
                platform: Platform::Cursor,
            });
        }
        Ok(Converted {
            data: config,
            warnings: vec![
                "no Cursor payload in context; rebuilt rules and MCP servers from the neutral sections"
                    .to_string(),
            ],
        })
    }

    fn render(&self, raw: &CursorConfig) -> Vec<PlannedFile> {
        render(raw)
    }
}

/// Platform-neutral sections carried by a Cursor payload.
pub fn sections(config: &CursorConfig) -> Sections {
    let rules = config.rules.as_deref().unwrap_or_default();
    let legacy = config.legacy_rules.as_deref().filter(|text| !text.trim().is_empty());
    let project = if legacy.is_some() || !rules.is_empty() {
        let always: Vec<&str> = rules
            .iter()
            .filter(|r| r.always_apply)
            .map(|r| r.content.as_str())
            .collect();
        let instructions = legacy
            .map(str::to_string)
            .or_else(|| (!always.is_empty()).then(|| always.join("\n\n")));
        Some(ProjectData {
            instructions,
            conventions: rules.iter().map(|r| r.name.clone()).collect(),
            ..Default::default()
        })
    } else {
        None
    };

    let mut custom_tools = Map::new();
    if let Some(tasks) = &config.tasks {
        custom_tools.insert("tasks".into(), tasks.clone());
    }
    if let Some(launch) = &config.launch {
        custom_tools.insert("launch".into(), launch.clone());
    }
    let servers = config.mcp_servers.clone().unwrap_or_default();
    let tools = (!servers.is_empty() || !custom_tools.is_empty()).then_some(ToolsData {
        mcp_servers: servers,
        custom_tools,
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
        prompts: None,
        tools,
        personal,
    }
}

/// Rebuilds a payload from the platform-neutral sections of any context.
pub fn from_sections(context: &TaptikContext) -> CursorConfig {
    let tools = context.tools.as_ref().map(|t| &t.data);
    CursorConfig {
        legacy_rules: context
            .project
            .as_ref()
            .and_then(|p| p.data.instructions.clone())
            .filter(|text| !text.trim().is_empty()),
        mcp_servers: tools
            .map(|t| t.mcp_servers.clone())
            .filter(|servers| !servers.is_empty()),
        tasks: tools.and_then(|t| t.custom_tools.get("tasks").cloned()),
        launch: tools.and_then(|t| t.custom_tools.get("launch").cloned()),
        ..Default::default()
    }
}

/// Structural, security and size checks for a Cursor payload.
pub fn check(config: &CursorConfig, limits: &SizeLimits, result: &mut ValidationResult) {
    for (i, rule) in config.rules.iter().flatten().enumerate() {
        require(result, &format!("cursor.rules[{i}].name"), &rule.name, "name");
    }
    if let Some(servers) = &config.mcp_servers {
        check_mcp_servers(result, "cursor.mcp_servers", servers);
        for server in servers {
            if let Ok(value) = serde_json::to_value(server) {
                check_json(result, &value, &format!("cursor.mcp_servers.{}", server.name));
            }
        }
    }
    if let Some(settings) = &config.settings {
        check_json(result, &Value::Object(settings.clone()), "cursor.settings");
    }
    if let Some(tasks) = &config.tasks {
        check_json(result, tasks, "cursor.tasks");
    }
    if let Some(launch) = &config.launch {
        check_json(result, launch, "cursor.launch");
    }

    let mut bundle = ContentBundle::new();
    for rule in config.rules.iter().flatten() {
        bundle.push(ContentKind::Rule, format!("rules/{}", rule.name), &rule.content);
    }
    if let Some(legacy) = &config.legacy_rules {
        bundle.push(ContentKind::Context, ".cursorrules", legacy);
    }
    check_content(result, &bundle, limits);
}

/// Native files for a Cursor payload. Settings are written with dotted keys.
pub fn render(config: &CursorConfig) -> Vec<PlannedFile> {
    let mut files = Vec::new();
    if let Some(settings) = &config.settings {
        files.push(PlannedFile::json(
            ".vscode/settings.json",
            Value::Object(flatten_settings(settings)),
        ));
    }
    for rule in config.rules.iter().flatten() {
        let meta = RuleMeta {
            description: rule.description.clone(),
            globs: (!rule.globs.is_empty())
                .then(|| serde_yaml::Value::String(rule.globs.join(","))),
            always_apply: rule.always_apply,
        };
        files.push(PlannedFile::text(
            Path::new(".cursor/rules").join(format!("{}.mdc", safe_file_name(&rule.name))),
            render_frontmatter(&meta, &rule.content),
        ));
    }
    if let Some(legacy) = &config.legacy_rules {
        files.push(PlannedFile::text(".cursorrules", legacy.clone()));
    }
    if let Some(servers) = &config.mcp_servers {
        files.push(PlannedFile::json(
            ".cursor/mcp.json",
            super::mcp::render_registry(servers),
        ));
    }
    if let Some(extensions) = &config.extensions {
        files.push(PlannedFile::json(
            ".vscode/extensions.json",
            json!({ "recommendations": extensions }),
        ));
    }
    for (name, snippets) in config.snippets.iter().flatten() {
        files.push(PlannedFile::json(
            Path::new(".vscode").join(format!("{}{SNIPPET_SUFFIX}", safe_file_name(name))),
            snippets.clone(),
        ));
    }
    if let Some(tasks) = &config.tasks {
        files.extend(json_file(".vscode/tasks.json", tasks));
    }
    if let Some(launch) = &config.launch {
        files.extend(json_file(".vscode/launch.json", launch));
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unflatten_first_segment_only() {
        let nested = unflatten_settings(obj(json!({
            "editor.fontSize": 14,
            "editor.minimap.enabled": false,
            "[rust]": {"editor.tabSize": 4},
            "telemetry": "off"
        })));
        assert_eq!(
            Value::Object(nested.clone()),
            json!({
                "editor": {"fontSize": 14, "minimap.enabled": false},
                "[rust]": {"editor.tabSize": 4},
                "telemetry": "off"
            })
        );
        assert_eq!(
            Value::Object(flatten_settings(&nested)),
            json!({
                "editor.fontSize": 14,
                "editor.minimap.enabled": false,
                "[rust]": {"editor.tabSize": 4},
                "telemetry": "off"
            })
        );
    }

    #[test]
    fn test_globs_string_or_list() {
        let s = serde_yaml::Value::String("src/**/*.ts, tests/**".into());
        assert_eq!(parse_globs(Some(s)), vec!["src/**/*.ts", "tests/**"]);
        let list: serde_yaml::Value = serde_yaml::from_str("[\"a/**\", \"b/**\"]").unwrap();
        assert_eq!(parse_globs(Some(list)), vec!["a/**", "b/**"]);
        assert!(parse_globs(None).is_empty());
    }

    #[test]
    fn test_rule_render_then_parse() {
        let rule = CursorRule {
            name: "typescript".into(),
            content: "Prefer `unknown` over `any`.\n".into(),
            description: Some("TypeScript style".into()),
            globs: vec!["src/**/*.ts".into()],
            always_apply: false,
        };
        let files = render(&CursorConfig {
            rules: Some(vec![rule.clone()]),
            ..Default::default()
        });
        let text = files[0].content.render();
        let (meta, body) = parse_frontmatter::<RuleMeta>(&text, "typescript.mdc");
        assert_eq!(body, rule.content);
        assert_eq!(parse_globs(meta.globs), rule.globs);
        assert_eq!(meta.description, rule.description);
    }

    #[test]
    fn test_tasks_and_launch_become_custom_tools() {
        let config = CursorConfig {
            tasks: Some(json!({"version": "2.0.0", "tasks": []})),
            ..Default::default()
        };
        let tools = sections(&config).tools.unwrap();
        assert!(tools.mcp_servers.is_empty());
        assert_eq!(tools.custom_tools["tasks"]["version"], "2.0.0");
    }

    #[test]
    fn test_rule_without_name_is_error() {
        let config = CursorConfig {
            rules: Some(vec![CursorRule {
                content: "x".into(),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let mut result = ValidationResult::new();
        check(&config, &SizeLimits::default(), &mut result);
        assert_eq!(result.errors[0].field, "cursor.rules[0].name");
    }
}
