//! Cursor to Claude Code.

use super::claude_cursor::terminal_env;
use super::mapping::{FeatureMapping, CURSOR_TO_CLAUDE_CODE};
use super::sections::{encode, EmbeddedSection, RuleMeta};
use super::traits::{wrong_source, ConverterStrategy, MappingNotes};
use crate::Result;
use taptik_core::{
    ClaudeCodeConfig, ClaudeSettings, CursorConfig, Platform, PlatformConfig, PlatformConfigRef,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct CursorToClaudeCode;

impl ConverterStrategy for CursorToClaudeCode {
    fn source(&self) -> Platform {
        Platform::Cursor
    }

    fn target(&self) -> Platform {
        Platform::ClaudeCode
    }

    fn feature_mapping(&self) -> &'static FeatureMapping {
        &CURSOR_TO_CLAUDE_CODE
    }

    fn translate(&self, source: PlatformConfigRef<'_>, notes: &mut MappingNotes) -> Result<PlatformConfig> {
        let PlatformConfigRef::Cursor(cursor) = source else {
            return Err(wrong_source(Platform::Cursor));
        };
        Ok(PlatformConfig::ClaudeCode(ClaudeCodeConfig {
            settings: settings(cursor, notes),
            mcp_servers: cursor.mcp_servers.clone(),
            claude_md: rules_to_markdown(cursor),
            ..Default::default()
        }))
    }
}

/// `.cursorrules` as the preamble, every project rule as an embedded section.
pub fn rules_to_markdown(cursor: &CursorConfig) -> Option<String> {
    if cursor.legacy_rules.is_none() && cursor.rules.as_ref().is_none_or(Vec::is_empty) {
        return None;
    }
    let sections: Vec<EmbeddedSection> = cursor
        .rules
        .iter()
        .flatten()
        .map(|rule| EmbeddedSection::rule(&RuleMeta::from(rule), rule.content.as_str()))
        .collect();
    Some(encode(cursor.legacy_rules.as_deref().unwrap_or_default(), &sections))
}

fn settings(cursor: &CursorConfig, notes: &mut MappingNotes) -> Option<ClaudeSettings> {
    let map = cursor.settings.as_ref()?;
    let env = terminal_env(map);
    let dropped = map.len() - usize::from(env.is_some());
    if dropped > 0 {
        notes.warn(format!("{dropped} Cursor setting group(s) not carried over"));
    }
    env.map(|env| ClaudeSettings {
        env: Some(env),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taptik_core::{CursorRule, McpServer, TaptikContext};

    fn context(cursor: CursorConfig) -> TaptikContext {
        TaptikContext::builder("demo")
            .platform_config(PlatformConfig::Cursor(cursor))
            .build()
    }

    #[test]
    fn test_legacy_rules_only_pass_through() {
        let cursor = CursorConfig {
            legacy_rules: Some("Prefer const.\n".into()),
            ..Default::default()
        };
        assert_eq!(rules_to_markdown(&cursor).as_deref(), Some("Prefer const.\n"));
    }

    #[test]
    fn test_extensions_and_tasks_are_unsupported() {
        let cursor = CursorConfig {
            rules: Some(vec![CursorRule {
                name: "ts".into(),
                content: "strict".into(),
                always_apply: true,
                ..Default::default()
            }]),
            mcp_servers: Some(vec![McpServer::http("docs", "https://example.com/mcp")]),
            extensions: Some(vec!["rust-lang.rust-analyzer".into()]),
            tasks: Some(json!({"version": "2.0.0"})),
            settings: Some(json!({"editor": {"fontSize": 14}}).as_object().cloned().unwrap()),
            ..Default::default()
        };
        let outcome = CursorToClaudeCode.convert(&context(cursor));
        assert!(outcome.success);
        assert_eq!(outcome.unsupported_features, ["extensions", "tasks"]);
        assert!(outcome.warnings.iter().any(|w| w.contains("1 Cursor setting group")));
        let ctx = outcome.context.unwrap();
        let Some(PlatformConfigRef::ClaudeCode(claude)) = ctx.platform_config(Platform::ClaudeCode) else {
            panic!("expected a Claude Code payload");
        };
        assert!(claude.claude_md.as_deref().unwrap().contains("taptik:rule"));
        assert!(claude.settings.is_none());
        assert_eq!(claude.mcp_servers.as_ref().unwrap()[0].name, "docs");
    }
}
