//! Kiro to Claude Code.
//!
//! Steering rules become sections of CLAUDE.md, specs become `spec-<name>`
//! slash commands, and hooks are split between lifecycle hooks and commands.

use super::mapping::{FeatureMapping, KIRO_TO_CLAUDE_CODE};
use super::sections::{encode, EmbeddedSection, RuleMeta, PREAMBLE_RULE};
use super::traits::{wrong_source, ConverterStrategy, MappingNotes};
use crate::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use taptik_core::{
    ClaudeCodeConfig, ClaudeHookCommand, ClaudeHookMatcher, ClaudeSettings, HookActionKind,
    HookEvent, KiroConfig, KiroHook, KiroSpec, Platform, PlatformConfig, PlatformConfigRef,
    SteeringInclusion, SteeringRule,
};

/// Command name prefix for converted specs.
pub const SPEC_COMMAND_PREFIX: &str = "spec-";
/// Command name prefix for converted askAgent hooks.
pub const HOOK_COMMAND_PREFIX: &str = "hook-";
/// Tool matcher used for file-change hooks.
pub const FILE_CHANGE_MATCHER: &str = "Edit|Write|MultiEdit";

pub const SPEC_DOCUMENTS: [&str; 3] = ["requirements", "design", "tasks"];

#[derive(Debug, Default, Clone, Copy)]
pub struct KiroToClaudeCode;

impl ConverterStrategy for KiroToClaudeCode {
    fn source(&self) -> Platform {
        Platform::Kiro
    }

    fn target(&self) -> Platform {
        Platform::ClaudeCode
    }

    fn feature_mapping(&self) -> &'static FeatureMapping {
        &KIRO_TO_CLAUDE_CODE
    }

    fn translate(&self, source: PlatformConfigRef<'_>, notes: &mut MappingNotes) -> Result<PlatformConfig> {
        let PlatformConfigRef::Kiro(kiro) = source else {
            return Err(wrong_source(Platform::Kiro));
        };

        let mut commands = BTreeMap::new();
        for spec in kiro.specs.iter().flatten() {
            commands.insert(format!("{SPEC_COMMAND_PREFIX}{}", spec.name), spec_command(spec));
        }

        let mut lifecycle: BTreeMap<String, Vec<ClaudeHookMatcher>> = BTreeMap::new();
        for hook in kiro.hooks.iter().flatten() {
            convert_hook(hook, &mut commands, &mut lifecycle, notes);
        }

        Ok(PlatformConfig::ClaudeCode(ClaudeCodeConfig {
            settings: settings(kiro, lifecycle, notes),
            mcp_servers: kiro.mcp_servers.clone(),
            claude_md: kiro.steering_rules.as_deref().map(steering_to_markdown),
            claude_local_md: None,
            commands: (!commands.is_empty()).then_some(commands),
            agents: None,
        }))
    }
}

/// CLAUDE.md for a set of steering rules.
///
/// An always-included rule named [`PREAMBLE_RULE`] is the free text at the top;
/// every other rule becomes an embedded section.
pub fn steering_to_markdown(rules: &[SteeringRule]) -> String {
    let mut preamble = String::new();
    let mut sections = Vec::new();
    for rule in rules {
        if rule.name == PREAMBLE_RULE
            && rule.inclusion == SteeringInclusion::Always
            && rule.file_match_pattern.is_none()
            && preamble.is_empty()
        {
            preamble = rule.content.clone();
        } else {
            sections.push(EmbeddedSection::rule(&RuleMeta::from(rule), rule.content.as_str()));
        }
    }
    encode(&preamble, &sections)
}

fn spec_command(spec: &KiroSpec) -> String {
    let documents = [&spec.requirements, &spec.design, &spec.tasks];
    let mut sections: Vec<EmbeddedSection> = SPEC_DOCUMENTS
        .iter()
        .zip(documents)
        .filter_map(|(name, doc)| doc.as_deref().map(|body| EmbeddedSection::spec(name, body)))
        .collect();
    if sections.is_empty() {
        sections.push(EmbeddedSection::spec_identity(&spec.name));
    }
    let preamble = format!("Work on the `{}` spec. Follow the documents below in order.\n", spec.name);
    encode(&preamble, &sections)
}

fn convert_hook(
    hook: &KiroHook,
    commands: &mut BTreeMap<String, String>,
    lifecycle: &mut BTreeMap<String, Vec<ClaudeHookMatcher>>,
    notes: &mut MappingNotes,
) {
    let key = hook.key();
    if !hook.enabled {
        notes.warn(format!("hook '{key}' is disabled and was not converted"));
        return;
    }
    match hook.then.kind {
        HookActionKind::AskAgent => match hook.then.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(prompt) => {
                commands.insert(format!("{HOOK_COMMAND_PREFIX}{key}"), prompt.to_string());
            }
            None => notes.warn(format!("hook '{key}' has no prompt and was not converted")),
        },
        HookActionKind::RunCommand => {
            let Some(command) = hook.then.command.as_deref().filter(|c| !c.trim().is_empty()) else {
                notes.warn(format!("hook '{key}' has no command and was not converted"));
                return;
            };
            let Some((event, matcher)) = lifecycle_event(hook.when.event) else {
                notes.warn(format!(
                    "hook '{key}' fires on {}, which has no Claude Code lifecycle event",
                    hook.when.event.as_str()
                ));
                return;
            };
            lifecycle.entry(event.to_string()).or_default().push(ClaudeHookMatcher {
                matcher: matcher.map(str::to_string),
                hooks: vec![ClaudeHookCommand::command(command)],
            });
        }
    }
}

/// Claude Code lifecycle event and tool matcher for a Kiro trigger.
pub fn lifecycle_event(event: HookEvent) -> Option<(&'static str, Option<&'static str>)> {
    match event {
        HookEvent::FileEdited | HookEvent::FileCreated => Some(("PostToolUse", Some(FILE_CHANGE_MATCHER))),
        HookEvent::PromptSubmit => Some(("UserPromptSubmit", None)),
        HookEvent::AgentStop => Some(("Stop", None)),
        HookEvent::FileDeleted | HookEvent::UserTriggered => None,
    }
}

fn settings(
    kiro: &KiroConfig,
    lifecycle: BTreeMap<String, Vec<ClaudeHookMatcher>>,
    notes: &mut MappingNotes,
) -> Option<ClaudeSettings> {
    let mut model = None;
    if let Some(map) = &kiro.settings {
        model = map.get("model").and_then(Value::as_str).map(str::to_string);
        let dropped: Vec<&str> = map.keys().map(String::as_str).filter(|k| *k != "model").collect();
        if !dropped.is_empty() {
            notes.warn(format!("Kiro settings not carried over: {}", dropped.join(", ")));
        }
    }
    let settings = ClaudeSettings {
        model,
        hooks: (!lifecycle.is_empty()).then_some(lifecycle),
        ..Default::default()
    };
    (!settings.is_empty()).then_some(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::sections::decode;
    use serde_json::json;
    use taptik_core::{HookAction, HookTrigger, McpServer, TaptikContext};

    fn hook(name: &str, event: HookEvent, then: HookAction) -> KiroHook {
        KiroHook {
            name: name.into(),
            version: "1".into(),
            enabled: true,
            when: HookTrigger {
                event,
                patterns: vec!["src/**/*.rs".into()],
            },
            then,
            ..Default::default()
        }
    }

    fn context(kiro: KiroConfig) -> TaptikContext {
        TaptikContext::builder("demo")
            .platform_config(PlatformConfig::Kiro(kiro))
            .build()
    }

    #[test]
    fn test_steering_becomes_claude_md_sections() {
        let rules = vec![
            SteeringRule {
                name: PREAMBLE_RULE.into(),
                content: "# Demo\n".into(),
                ..Default::default()
            },
            SteeringRule {
                name: "rust".into(),
                content: "Use clippy.".into(),
                inclusion: SteeringInclusion::FileMatch,
                file_match_pattern: Some("**/*.rs".into()),
            },
        ];
        let md = steering_to_markdown(&rules);
        assert!(md.starts_with("# Demo\n"));
        let doc = decode(&md);
        assert_eq!(doc.preamble, "# Demo\n");
        let meta = doc.sections[0].as_rule().unwrap();
        assert_eq!(meta.name, "rust");
        assert_eq!(meta.globs, ["**/*.rs"]);
    }

    #[test]
    fn test_hooks_split_between_lifecycle_and_commands() {
        let kiro = KiroConfig {
            hooks: Some(vec![
                hook(
                    "fmt",
                    HookEvent::FileEdited,
                    HookAction {
                        kind: HookActionKind::RunCommand,
                        command: Some("cargo fmt".into()),
                        prompt: None,
                    },
                ),
                hook(
                    "review",
                    HookEvent::UserTriggered,
                    HookAction {
                        kind: HookActionKind::AskAgent,
                        prompt: Some("Review the change".into()),
                        command: None,
                    },
                ),
                KiroHook {
                    enabled: false,
                    ..hook("old", HookEvent::AgentStop, HookAction::default())
                },
            ]),
            ..Default::default()
        };
        let outcome = KiroToClaudeCode.convert(&context(kiro));
        assert!(outcome.success);
        let ctx = outcome.context.unwrap();
        let Some(PlatformConfigRef::ClaudeCode(claude)) = ctx.platform_config(Platform::ClaudeCode) else {
            panic!("expected a Claude Code payload");
        };
        let hooks = claude.settings.as_ref().unwrap().hooks.as_ref().unwrap();
        assert_eq!(hooks["PostToolUse"][0].matcher.as_deref(), Some(FILE_CHANGE_MATCHER));
        assert_eq!(hooks["PostToolUse"][0].hooks[0].command, "cargo fmt");
        assert_eq!(claude.commands.as_ref().unwrap()["hook-review"], "Review the change");
        assert!(outcome.warnings.iter().any(|w| w.contains("'old' is disabled")));
        assert_eq!(outcome.approximations[0].feature, "hooks");
    }

    #[test]
    fn test_unsupported_features_are_reported() {
        let kiro = KiroConfig {
            mcp_servers: Some(vec![McpServer::stdio("fs", "npx")]),
            project_settings: Some(json!({"name": "demo"}).as_object().cloned().unwrap()),
            settings: Some(json!({"model": "sonnet", "theme": "dark"}).as_object().cloned().unwrap()),
            ..Default::default()
        };
        let outcome = KiroToClaudeCode.convert(&context(kiro));
        assert_eq!(outcome.unsupported_features, ["project_settings"]);
        assert!(outcome.warnings.iter().any(|w| w.contains("theme")));
        let ctx = outcome.context.unwrap();
        assert!(ctx.has_source_configuration(Platform::Kiro));
        assert_eq!(
            ctx.metadata.conversion.as_ref().map(|c| (c.source, c.target)),
            Some((Platform::Kiro, Platform::ClaudeCode))
        );
        assert_eq!(ctx.tools.unwrap().data.mcp_servers[0].name, "fs");
    }

    #[test]
    fn test_missing_source_fails() {
        let outcome = KiroToClaudeCode.convert(&TaptikContext::builder("x").build());
        assert!(!outcome.success);
        assert!(matches!(
            outcome.error,
            Some(taptik_core::TaptikError::NoSourceConfiguration { platform: Platform::Kiro })
        ));
    }
}
