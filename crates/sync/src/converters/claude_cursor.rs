//! Claude Code to Cursor.

use super::mapping::{FeatureMapping, CLAUDE_CODE_TO_CURSOR};
use super::sections::decode;
use super::traits::{wrong_source, ConverterStrategy, MappingNotes};
use crate::Result;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use taptik_core::{
    ClaudeCodeConfig, CursorConfig, CursorRule, Platform, PlatformConfig, PlatformConfigRef,
};

/// Settings group holding the integrated terminal options.
pub const TERMINAL_GROUP: &str = "terminal";
/// Per-OS environment keys inside [`TERMINAL_GROUP`], in lookup order.
pub const TERMINAL_ENV_KEYS: [&str; 3] = [
    "integrated.env.linux",
    "integrated.env.osx",
    "integrated.env.windows",
];

/// Rule name for CLAUDE.local.md.
pub const LOCAL_RULE: &str = "claude-local";

#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeCodeToCursor;

impl ConverterStrategy for ClaudeCodeToCursor {
    fn source(&self) -> Platform {
        Platform::ClaudeCode
    }

    fn target(&self) -> Platform {
        Platform::Cursor
    }

    fn feature_mapping(&self) -> &'static FeatureMapping {
        &CLAUDE_CODE_TO_CURSOR
    }

    fn translate(&self, source: PlatformConfigRef<'_>, notes: &mut MappingNotes) -> Result<PlatformConfig> {
        let PlatformConfigRef::ClaudeCode(claude) = source else {
            return Err(wrong_source(Platform::ClaudeCode));
        };

        let mut legacy_rules = None;
        let mut rules = Vec::new();
        if let Some(md) = claude.claude_md.as_deref() {
            let doc = decode(md);
            if !doc.preamble.is_empty() || doc.sections.is_empty() {
                legacy_rules = Some(doc.preamble);
            }
            for section in doc.sections {
                match section.as_rule() {
                    Some(meta) => rules.push(meta.into_cursor_rule(section.body)),
                    None => notes.warn(format!(
                        "CLAUDE.md section of kind '{}' has no Cursor equivalent",
                        section.kind
                    )),
                }
            }
        }
        for (name, body) in claude.commands.iter().flatten() {
            rules.push(CursorRule {
                name: name.clone(),
                content: body.clone(),
                description: Some(format!("Claude Code command /{name}")),
                globs: Vec::new(),
                always_apply: false,
            });
        }
        if let Some(local) = claude.claude_local_md.as_deref().filter(|md| !md.is_empty()) {
            rules.push(CursorRule {
                name: LOCAL_RULE.to_string(),
                content: local.to_string(),
                description: Some("Personal project instructions".to_string()),
                globs: Vec::new(),
                always_apply: true,
            });
        }
        for (name, body) in claude.agents.iter().flatten() {
            rules.push(CursorRule {
                name: format!("agent-{name}"),
                content: body.clone(),
                description: Some(format!("Claude Code subagent {name}")),
                globs: Vec::new(),
                always_apply: false,
            });
        }

        Ok(PlatformConfig::Cursor(CursorConfig {
            settings: terminal_settings(claude),
            rules: (!rules.is_empty()).then_some(rules),
            legacy_rules,
            mcp_servers: claude.mcp_servers.clone(),
            ..Default::default()
        }))
    }
}

fn terminal_settings(claude: &ClaudeCodeConfig) -> Option<Map<String, Value>> {
    let env = claude
        .settings
        .as_ref()
        .and_then(|s| s.env.as_ref())
        .filter(|env| !env.is_empty())?;
    let mut terminal = Map::new();
    for key in TERMINAL_ENV_KEYS {
        terminal.insert(key.to_string(), json!(env));
    }
    let mut settings = Map::new();
    settings.insert(TERMINAL_GROUP.to_string(), Value::Object(terminal));
    Some(settings)
}

/// Terminal environment from nested Cursor settings, first OS key that parses.
pub fn terminal_env(settings: &Map<String, Value>) -> Option<BTreeMap<String, String>> {
    let terminal = settings.get(TERMINAL_GROUP)?.as_object()?;
    TERMINAL_ENV_KEYS
        .iter()
        .filter_map(|key| terminal.get(*key))
        .find_map(|env| serde_json::from_value::<BTreeMap<String, String>>(env.clone()).ok())
        .filter(|env| !env.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::sections::{encode, EmbeddedSection, RuleMeta};
    use taptik_core::{ClaudeSettings, SteeringInclusion, TaptikContext};

    fn convert(claude: ClaudeCodeConfig) -> (CursorConfig, Vec<String>) {
        let ctx = TaptikContext::builder("demo")
            .platform_config(PlatformConfig::ClaudeCode(claude))
            .build();
        let outcome = ClaudeCodeToCursor.convert(&ctx);
        assert!(outcome.success);
        let context = outcome.context.unwrap();
        match context.platform_config(Platform::Cursor) {
            Some(PlatformConfigRef::Cursor(c)) => (c.clone(), outcome.unsupported_features),
            _ => panic!("expected a Cursor payload"),
        }
    }

    #[test]
    fn test_plain_claude_md_becomes_legacy_rules() {
        let (cursor, _) = convert(ClaudeCodeConfig {
            claude_md: Some("# Demo\n".into()),
            ..Default::default()
        });
        assert_eq!(cursor.legacy_rules.as_deref(), Some("# Demo\n"));
        assert!(cursor.rules.is_none());
    }

    #[test]
    fn test_embedded_rules_become_cursor_rules() {
        let meta = RuleMeta {
            name: "ts".into(),
            inclusion: SteeringInclusion::FileMatch,
            globs: vec!["*.ts".into()],
            description: Some("TypeScript".into()),
            ..Default::default()
        };
        let md = encode("# Demo\n", &[EmbeddedSection::rule(&meta, "strict mode")]);
        let (cursor, _) = convert(ClaudeCodeConfig {
            claude_md: Some(md),
            ..Default::default()
        });
        let rules = cursor.rules.unwrap();
        assert_eq!(rules[0].name, "ts");
        assert_eq!(rules[0].globs, ["*.ts"]);
        assert!(!rules[0].always_apply);
        assert_eq!(cursor.legacy_rules.as_deref(), Some("# Demo\n"));
    }

    #[test]
    fn test_env_moves_to_terminal_settings() {
        let mut env = BTreeMap::new();
        env.insert("RUST_LOG".to_string(), "debug".to_string());
        let (cursor, unsupported) = convert(ClaudeCodeConfig {
            settings: Some(ClaudeSettings {
                env: Some(env.clone()),
                permissions: Some(Default::default()),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(terminal_env(cursor.settings.as_ref().unwrap()), Some(env));
        assert_eq!(unsupported, ["permissions"]);
    }
}
