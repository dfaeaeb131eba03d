//! Claude Code to Kiro.

use super::kiro_claude::SPEC_COMMAND_PREFIX;
use super::mapping::{FeatureMapping, CLAUDE_CODE_TO_KIRO};
use super::sections::{decode, PREAMBLE_RULE};
use super::traits::{wrong_source, ConverterStrategy, MappingNotes};
use crate::builders::kiro::SPECS_PATH;
use crate::Result;
use serde_json::{json, Map, Value};
use taptik_core::{
    ClaudeCodeConfig, ClaudeHookMatcher, HookAction, HookActionKind, HookEvent, HookTrigger,
    KiroConfig, KiroHook, KiroSpec, Platform, PlatformConfig, PlatformConfigRef,
    SteeringInclusion, SteeringRule,
};

/// Steering rule name for CLAUDE.local.md.
pub const LOCAL_RULE: &str = "claude-local";
/// Steering rule name prefix for subagents.
pub const AGENT_RULE_PREFIX: &str = "agent-";

#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeCodeToKiro;

impl ConverterStrategy for ClaudeCodeToKiro {
    fn source(&self) -> Platform {
        Platform::ClaudeCode
    }

    fn target(&self) -> Platform {
        Platform::Kiro
    }

    fn feature_mapping(&self) -> &'static FeatureMapping {
        &CLAUDE_CODE_TO_KIRO
    }

    fn translate(&self, source: PlatformConfigRef<'_>, notes: &mut MappingNotes) -> Result<PlatformConfig> {
        let PlatformConfigRef::ClaudeCode(claude) = source else {
            return Err(wrong_source(Platform::ClaudeCode));
        };

        let mut steering: Option<Vec<SteeringRule>> =
            claude.claude_md.as_deref().map(|md| markdown_to_steering(md, notes));
        let mut extra_rules = Vec::new();
        let mut specs = Vec::new();

        for (name, body) in claude.commands.iter().flatten() {
            match name.strip_prefix(SPEC_COMMAND_PREFIX).and_then(|spec| command_to_spec(spec, body)) {
                Some(spec) => specs.push(spec),
                None => extra_rules.push(manual_rule(name, body)),
            }
        }
        if let Some(local) = claude.claude_local_md.as_deref().filter(|md| !md.is_empty()) {
            extra_rules.push(SteeringRule {
                name: LOCAL_RULE.to_string(),
                content: local.to_string(),
                inclusion: SteeringInclusion::Always,
                file_match_pattern: None,
            });
        }
        for (name, body) in claude.agents.iter().flatten() {
            extra_rules.push(manual_rule(&format!("{AGENT_RULE_PREFIX}{name}"), body));
        }
        if !extra_rules.is_empty() {
            steering.get_or_insert_with(Vec::new).extend(extra_rules);
        }
        if let Some(rules) = steering.as_mut() {
            rules.sort_by(|a, b| a.name.cmp(&b.name));
        }
        specs.sort_by(|a, b| a.name.cmp(&b.name));

        let hooks = hooks(claude, notes);
        let has_specs = !specs.is_empty();
        Ok(PlatformConfig::Kiro(KiroConfig {
            specs_path: has_specs.then(|| SPECS_PATH.to_string()),
            specs: has_specs.then_some(specs),
            steering_rules: steering,
            hooks: (!hooks.is_empty()).then_some(hooks),
            mcp_servers: claude.mcp_servers.clone(),
            task_templates: None,
            settings: settings(claude, notes),
            project_settings: None,
        }))
    }
}

/// Steering rules for a CLAUDE.md document; inverse of
/// [`steering_to_markdown`](super::kiro_claude::steering_to_markdown).
pub fn markdown_to_steering(markdown: &str, notes: &mut MappingNotes) -> Vec<SteeringRule> {
    let doc = decode(markdown);
    let mut rules = Vec::new();
    if !doc.preamble.is_empty() {
        rules.push(SteeringRule {
            name: PREAMBLE_RULE.to_string(),
            content: doc.preamble,
            inclusion: SteeringInclusion::Always,
            file_match_pattern: None,
        });
    }
    for section in doc.sections {
        match section.as_rule() {
            Some(meta) => rules.push(meta.into_steering_rule(section.body)),
            None => notes.warn(format!(
                "CLAUDE.md section of kind '{}' has no steering equivalent",
                section.kind
            )),
        }
    }
    rules
}

fn manual_rule(name: &str, body: &str) -> SteeringRule {
    SteeringRule {
        name: name.to_string(),
        content: body.to_string(),
        inclusion: SteeringInclusion::Manual,
        file_match_pattern: None,
    }
}

/// Rebuilds a spec from a `spec-<name>` command; `None` when it has neither
/// spec documents nor a spec identity marker for `name`.
fn command_to_spec(name: &str, body: &str) -> Option<KiroSpec> {
    let doc = decode(body);
    let mut spec = KiroSpec {
        name: name.to_string(),
        ..Default::default()
    };
    let mut found = false;
    for section in &doc.sections {
        if section.spec_name() == Some(name) {
            found = true;
            continue;
        }
        let slot = match section.spec_document() {
            Some("requirements") => &mut spec.requirements,
            Some("design") => &mut spec.design,
            Some("tasks") => &mut spec.tasks,
            _ => continue,
        };
        *slot = Some(section.body.clone());
        found = true;
    }
    found.then_some(spec)
}

fn hooks(claude: &ClaudeCodeConfig, notes: &mut MappingNotes) -> Vec<KiroHook> {
    let Some(events) = claude.settings.as_ref().and_then(|s| s.hooks.as_ref()) else {
        return Vec::new();
    };
    let mut hooks = Vec::new();
    for (event, matchers) in events {
        let Some(trigger) = kiro_event(event) else {
            notes.warn(format!("{event} hooks have no Kiro trigger and were dropped"));
            continue;
        };
        for (i, matcher) in matchers.iter().enumerate() {
            hooks.extend(matcher_hooks(event, i, trigger, matcher));
        }
    }
    hooks
}

fn matcher_hooks<'a>(
    event: &'a str,
    index: usize,
    trigger: HookEvent,
    matcher: &'a ClaudeHookMatcher,
) -> impl Iterator<Item = KiroHook> + 'a {
    matcher.hooks.iter().enumerate().map(move |(j, command)| {
        let name = if matcher.hooks.len() == 1 {
            format!("{}-{}", event.to_lowercase(), index + 1)
        } else {
            format!("{}-{}-{}", event.to_lowercase(), index + 1, j + 1)
        };
        KiroHook {
            id: None,
            name,
            version: "1".to_string(),
            description: matcher.matcher.as_ref().map(|m| format!("Converted from {event} ({m})")),
            enabled: true,
            when: HookTrigger {
                event: trigger,
                patterns: match trigger {
                    HookEvent::FileEdited => vec!["**/*".to_string()],
                    _ => Vec::new(),
                },
            },
            then: HookAction {
                kind: HookActionKind::RunCommand,
                prompt: None,
                command: Some(command.command.clone()),
            },
        }
    })
}

/// Kiro trigger for a Claude Code lifecycle event.
pub fn kiro_event(event: &str) -> Option<HookEvent> {
    match event {
        "PostToolUse" => Some(HookEvent::FileEdited),
        "UserPromptSubmit" => Some(HookEvent::PromptSubmit),
        "Stop" | "SubagentStop" => Some(HookEvent::AgentStop),
        _ => None,
    }
}

fn settings(claude: &ClaudeCodeConfig, notes: &mut MappingNotes) -> Option<Map<String, Value>> {
    let settings = claude.settings.as_ref()?;
    if !settings.extra.is_empty() {
        let keys: Vec<&str> = settings.extra.keys().map(String::as_str).collect();
        notes.warn(format!("Claude Code settings not carried over: {}", keys.join(", ")));
    }
    let model = settings.model.as_ref()?;
    let mut map = Map::new();
    map.insert("model".to_string(), json!(model));
    Some(map)
}
