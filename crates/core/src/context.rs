//! The canonical interchange document every builder and converter reads and writes.
//!
//! A context is never mutated in place across pipeline stages: each stage takes
//! a `&TaptikContext` and produces a new value through [`ContextBuilder`].

use crate::config::{
    ClaudeCodeConfig, CursorConfig, KiroConfig, McpServer, PlatformConfig, PlatformConfigRef,
};
use crate::error::{Result, TaptikError};
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;

/// Version written into newly created contexts.
pub const CONTEXT_VERSION: &str = "1.0.0";
/// Semver requirement a context must satisfy to be processed.
pub const SUPPORTED_VERSION_REQ: &str = "^1.0";
/// Version stamped on each section.
pub const SECTION_SPEC_VERSION: &str = "1.0.0";

/// Canonical, platform-neutral configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaptikContext {
    pub version: String,
    pub metadata: ContextMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ide: Option<Section<IdeData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Section<ProjectData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Section<PromptsData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Section<ToolsData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal: Option<Section<PersonalData>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextMetadata {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub platforms: BTreeSet<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionStamp>,
}

/// Records which converter produced a context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionStamp {
    pub source: Platform,
    pub target: Platform,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// A versioned section payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section<T> {
    pub spec_version: String,
    pub data: T,
}

impl<T> Section<T> {
    pub fn new(data: T) -> Self {
        Self {
            spec_version: SECTION_SPEC_VERSION.to_string(),
            data,
        }
    }
}

/// IDE section: one optional payload per known platform plus passthrough keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IdeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_code: Option<ClaudeCodeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kiro: Option<KiroConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorConfig>,
    /// Payloads for platforms this version does not model.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl IdeData {
    pub fn get(&self, platform: Platform) -> Option<PlatformConfigRef<'_>> {
        match platform {
            Platform::ClaudeCode => self.claude_code.as_ref().map(PlatformConfigRef::ClaudeCode),
            Platform::Kiro => self.kiro.as_ref().map(PlatformConfigRef::Kiro),
            Platform::Cursor => self.cursor.as_ref().map(PlatformConfigRef::Cursor),
        }
    }

    /// Returns a copy with `config` added or replacing the same platform's payload.
    pub fn with_config(mut self, config: PlatformConfig) -> Self {
        match config {
            PlatformConfig::ClaudeCode(c) => self.claude_code = Some(c),
            PlatformConfig::Kiro(c) => self.kiro = Some(c),
            PlatformConfig::Cursor(c) => self.cursor = Some(c),
        }
        self
    }

    /// True when every known platform payload is absent or empty and nothing passes through.
    pub fn is_empty(&self) -> bool {
        Platform::ALL
            .iter()
            .all(|p| self.get(*p).is_none_or(|c| c.is_empty()))
            && self.other.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form project instructions (markdown).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conventions: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptsData {
    #[serde(default)]
    pub templates: Vec<PromptTemplate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptTemplate {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolsData {
    #[serde(default)]
    pub mcp_servers: Vec<McpServer>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_tools: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonalData {
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl TaptikContext {
    /// Starts a fresh context with the current timestamp and no sections.
    pub fn builder(name: impl Into<String>) -> ContextBuilder {
        ContextBuilder::new(name)
    }

    /// Starts a builder seeded with a copy of this context.
    pub fn to_builder(&self) -> ContextBuilder {
        ContextBuilder {
            context: self.clone(),
        }
    }

    pub fn platform_config(&self, platform: Platform) -> Option<PlatformConfigRef<'_>> {
        self.ide.as_ref().and_then(|ide| ide.data.get(platform))
    }

    /// True when `platform` has a non-empty payload in the `ide` section.
    pub fn has_source_configuration(&self, platform: Platform) -> bool {
        self.platform_config(platform).is_some_and(|c| !c.is_empty())
    }

    /// Rejects contexts whose `version` is not semver or outside [`SUPPORTED_VERSION_REQ`].
    pub fn check_version(&self) -> Result<()> {
        let unsupported = || TaptikError::UnsupportedVersion {
            found: self.version.clone(),
            required: SUPPORTED_VERSION_REQ.to_string(),
        };
        let version = semver::Version::parse(&self.version).map_err(|_| unsupported())?;
        let req = semver::VersionReq::parse(SUPPORTED_VERSION_REQ)
            .map_err(|e| TaptikError::Serialization(e.to_string()))?;
        if req.matches(&version) {
            Ok(())
        } else {
            Err(unsupported())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let context: Self = serde_json::from_str(content)?;
        context.check_version()?;
        Ok(context)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Produces a new [`TaptikContext`] value per pipeline stage.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    context: TaptikContext,
}

impl ContextBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            context: TaptikContext {
                version: CONTEXT_VERSION.to_string(),
                metadata: ContextMetadata {
                    name: name.into(),
                    created_at: now,
                    updated_at: now,
                    platforms: BTreeSet::new(),
                    conversion: None,
                },
                ide: None,
                project: None,
                prompts: None,
                tools: None,
                personal: None,
            },
        }
    }

    /// Adds (or replaces) one platform's payload and records the platform.
    pub fn platform_config(mut self, config: PlatformConfig) -> Self {
        self.context.metadata.platforms.insert(config.platform());
        let ide = self
            .context
            .ide
            .take()
            .map(|s| s.data)
            .unwrap_or_default()
            .with_config(config);
        self.context.ide = Some(Section::new(ide));
        self
    }

    /// Replaces the platform set.
    pub fn platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.context.metadata.platforms = platforms.into_iter().collect();
        self
    }

    pub fn project(mut self, data: Option<ProjectData>) -> Self {
        self.context.project = data.map(Section::new);
        self
    }

    pub fn prompts(mut self, data: Option<PromptsData>) -> Self {
        self.context.prompts = data.map(Section::new);
        self
    }

    pub fn tools(mut self, data: Option<ToolsData>) -> Self {
        self.context.tools = data.map(Section::new);
        self
    }

    pub fn personal(mut self, data: Option<PersonalData>) -> Self {
        self.context.personal = data.map(Section::new);
        self
    }

    /// Stamps `metadata.conversion` and bumps `updated_at`.
    pub fn converted(mut self, source: Platform, target: Platform) -> Self {
        let now = OffsetDateTime::now_utc();
        self.context.metadata.conversion = Some(ConversionStamp {
            source,
            target,
            timestamp: now,
        });
        self.context.metadata.updated_at = now;
        self
    }

    pub fn build(self) -> TaptikContext {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SteeringRule;

    fn kiro_context() -> TaptikContext {
        TaptikContext::builder("demo")
            .platform_config(PlatformConfig::Kiro(KiroConfig {
                steering_rules: Some(vec![SteeringRule {
                    name: "style".into(),
                    content: "Use tabs".into(),
                    ..Default::default()
                }]),
                ..Default::default()
            }))
            .build()
    }

    #[test]
    fn test_builder_records_platform() {
        let ctx = kiro_context();
        assert!(ctx.metadata.platforms.contains(&Platform::Kiro));
        assert!(ctx.has_source_configuration(Platform::Kiro));
        assert!(!ctx.has_source_configuration(Platform::ClaudeCode));
    }

    #[test]
    fn test_to_builder_leaves_original_untouched() {
        let original = kiro_context();
        let converted = original
            .to_builder()
            .platform_config(PlatformConfig::ClaudeCode(ClaudeCodeConfig {
                claude_md: Some("# Style".into()),
                ..Default::default()
            }))
            .platforms([Platform::ClaudeCode])
            .converted(Platform::Kiro, Platform::ClaudeCode)
            .build();

        assert!(original.metadata.conversion.is_none());
        assert!(original.platform_config(Platform::ClaudeCode).is_none());
        assert_eq!(
            converted.metadata.platforms.iter().copied().collect::<Vec<_>>(),
            vec![Platform::ClaudeCode]
        );
        assert_eq!(
            converted.metadata.conversion.as_ref().map(|c| c.target),
            Some(Platform::ClaudeCode)
        );
    }

    #[test]
    fn test_empty_platform_payload_is_not_source_configuration() {
        let ctx = TaptikContext::builder("empty")
            .platform_config(PlatformConfig::Cursor(CursorConfig::default()))
            .build();
        assert!(!ctx.has_source_configuration(Platform::Cursor));
        assert!(ctx.ide.as_ref().unwrap().data.is_empty());
    }

    #[test]
    fn test_json_round_trip_keeps_absent_sections_absent() {
        let ctx = kiro_context();
        let json = ctx.to_json_pretty().unwrap();
        assert!(!json.contains("\"project\""));
        let back = TaptikContext::from_json(&json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_unknown_ide_keys_pass_through() {
        let mut value = serde_json::to_value(kiro_context()).unwrap();
        value["ide"]["data"]["windsurf"] = serde_json::json!({"rules": "be nice"});
        let ctx: TaptikContext = serde_json::from_value(value).unwrap();
        let ide = &ctx.ide.as_ref().unwrap().data;
        assert_eq!(ide.other["windsurf"]["rules"], "be nice");
        assert!(ide.kiro.is_some());
        assert!(!ide.is_empty());
    }

    #[test]
    fn test_version_check() {
        let mut ctx = kiro_context();
        assert!(ctx.check_version().is_ok());
        ctx.version = "2.0.0".into();
        let err = ctx.check_version().unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_VERSION");
        ctx.version = "not-semver".into();
        assert!(ctx.check_version().is_err());
    }
}
