//! Static feature-mapping tables, one per converter pair.
//!
//! Each source feature is classified exactly once as a direct (lossless)
//! mapping, an approximation with a confidence level, or unsupported. The
//! tables drive both conversion bookkeeping and compatibility scoring.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use taptik_core::PlatformConfigRef;

/// How faithfully an approximated feature survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Support level (0-100) used by the compatibility score.
    pub fn support_level(&self) -> u32 {
        match self {
            Self::High => 80,
            Self::Medium => 60,
            Self::Low => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproximateMapping {
    pub target: &'static str,
    pub confidence: Confidence,
    pub notes: &'static str,
}

/// Classification of one source feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSupport<'a> {
    Direct(&'static str),
    Approximate(&'a ApproximateMapping),
    Unsupported,
}

/// The three-way partition of a source platform's features for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureMapping {
    pub direct_mappings: BTreeMap<&'static str, &'static str>,
    pub approximations: BTreeMap<&'static str, ApproximateMapping>,
    pub unsupported: BTreeSet<&'static str>,
}

impl FeatureMapping {
    fn direct(mut self, feature: &'static str, target: &'static str) -> Self {
        self.direct_mappings.insert(feature, target);
        self
    }

    fn approx(
        mut self,
        feature: &'static str,
        target: &'static str,
        confidence: Confidence,
        notes: &'static str,
    ) -> Self {
        self.approximations.insert(
            feature,
            ApproximateMapping {
                target,
                confidence,
                notes,
            },
        );
        self
    }

    fn unsupported(mut self, feature: &'static str) -> Self {
        self.unsupported.insert(feature);
        self
    }

    /// Features missing from every partition count as unsupported.
    pub fn classify(&self, feature: &str) -> FeatureSupport<'_> {
        if let Some(target) = self.direct_mappings.get(feature) {
            FeatureSupport::Direct(target)
        } else if let Some(approx) = self.approximations.get(feature) {
            FeatureSupport::Approximate(approx)
        } else {
            FeatureSupport::Unsupported
        }
    }
}

pub static KIRO_TO_CLAUDE_CODE: LazyLock<FeatureMapping> = LazyLock::new(|| {
    FeatureMapping::default()
        .direct("specs", "commands")
        .direct("steering_rules", "claude_md")
        .direct("mcp_servers", "mcp_servers")
        .approx(
            "hooks",
            "settings.hooks",
            Confidence::Medium,
            "runCommand hooks become lifecycle hooks; askAgent hooks become hook-<name> commands; disabled hooks are dropped",
        )
        .approx(
            "settings",
            "settings",
            Confidence::Low,
            "only the model preference carries over",
        )
        .unsupported("task_templates")
        .unsupported("project_settings")
});

pub static CLAUDE_CODE_TO_KIRO: LazyLock<FeatureMapping> = LazyLock::new(|| {
    FeatureMapping::default()
        .direct("claude_md", "steering_rules")
        .direct("mcp_servers", "mcp_servers")
        .approx(
            "commands",
            "steering_rules",
            Confidence::Medium,
            "commands become manual steering rules; spec-<name> commands are restored as specs",
        )
        .approx(
            "claude_local_md",
            "steering_rules",
            Confidence::Medium,
            "personal instructions become an always-included steering rule",
        )
        .approx(
            "agents",
            "steering_rules",
            Confidence::Low,
            "subagent prompts become manual steering rules without tool restrictions",
        )
        .approx(
            "hooks",
            "hooks",
            Confidence::Medium,
            "lifecycle hooks become runCommand hooks; tool-level matchers are lost",
        )
        .approx(
            "settings",
            "settings",
            Confidence::Low,
            "only the model preference carries over",
        )
        .unsupported("permissions")
        .unsupported("env")
});

pub static CLAUDE_CODE_TO_CURSOR: LazyLock<FeatureMapping> = LazyLock::new(|| {
    FeatureMapping::default()
        .direct("claude_md", "legacy_rules")
        .direct("mcp_servers", "mcp_servers")
        .approx(
            "commands",
            "rules",
            Confidence::Medium,
            "commands become manually attached rules",
        )
        .approx(
            "claude_local_md",
            "rules",
            Confidence::Medium,
            "personal instructions become an always-applied rule",
        )
        .approx(
            "agents",
            "rules",
            Confidence::Low,
            "subagent prompts become manually attached rules",
        )
        .approx(
            "env",
            "settings",
            Confidence::Low,
            "environment variables move to terminal.integrated.env.*",
        )
        .unsupported("permissions")
        .unsupported("hooks")
        .unsupported("settings")
});

pub static CURSOR_TO_CLAUDE_CODE: LazyLock<FeatureMapping> = LazyLock::new(|| {
    FeatureMapping::default()
        .direct("legacy_rules", "claude_md")
        .direct("mcp_servers", "mcp_servers")
        .approx(
            "rules",
            "claude_md",
            Confidence::Medium,
            "rules are embedded as sections of CLAUDE.md; globs are kept but not enforced",
        )
        .approx(
            "settings",
            "settings",
            Confidence::Low,
            "only terminal environment variables carry over",
        )
        .unsupported("extensions")
        .unsupported("snippets")
        .unsupported("tasks")
        .unsupported("launch")
});

/// Source features that carry data, in a stable order.
pub fn observed_features(config: PlatformConfigRef<'_>) -> Vec<&'static str> {
    let mut features = Vec::new();
    let mut observe = |present: bool, feature: &'static str| {
        if present {
            features.push(feature);
        }
    };
    match config {
        PlatformConfigRef::Kiro(c) => {
            observe(
                c.specs_path.is_some() || c.specs.as_ref().is_some_and(|s| !s.is_empty()),
                "specs",
            );
            observe(c.steering_rules.as_ref().is_some_and(|r| !r.is_empty()), "steering_rules");
            observe(c.hooks.as_ref().is_some_and(|h| !h.is_empty()), "hooks");
            observe(c.mcp_servers.as_ref().is_some_and(|m| !m.is_empty()), "mcp_servers");
            observe(c.task_templates.as_ref().is_some_and(|t| !t.is_empty()), "task_templates");
            observe(c.settings.as_ref().is_some_and(|s| !s.is_empty()), "settings");
            observe(c.project_settings.as_ref().is_some_and(|s| !s.is_empty()), "project_settings");
        }
        PlatformConfigRef::ClaudeCode(c) => {
            let settings = c.settings.as_ref();
            observe(
                settings.is_some_and(|s| s.model.is_some() || !s.extra.is_empty()),
                "settings",
            );
            observe(settings.is_some_and(|s| s.permissions.is_some()), "permissions");
            observe(
                settings.is_some_and(|s| s.hooks.as_ref().is_some_and(|h| !h.is_empty())),
                "hooks",
            );
            observe(
                settings.is_some_and(|s| s.env.as_ref().is_some_and(|e| !e.is_empty())),
                "env",
            );
            observe(c.mcp_servers.as_ref().is_some_and(|m| !m.is_empty()), "mcp_servers");
            observe(c.claude_md.as_deref().is_some_and(|s| !s.is_empty()), "claude_md");
            observe(
                c.claude_local_md.as_deref().is_some_and(|s| !s.is_empty()),
                "claude_local_md",
            );
            observe(c.commands.as_ref().is_some_and(|m| !m.is_empty()), "commands");
            observe(c.agents.as_ref().is_some_and(|m| !m.is_empty()), "agents");
        }
        PlatformConfigRef::Cursor(c) => {
            observe(c.settings.as_ref().is_some_and(|s| !s.is_empty()), "settings");
            observe(c.rules.as_ref().is_some_and(|r| !r.is_empty()), "rules");
            observe(c.legacy_rules.as_deref().is_some_and(|s| !s.is_empty()), "legacy_rules");
            observe(c.mcp_servers.as_ref().is_some_and(|m| !m.is_empty()), "mcp_servers");
            observe(c.extensions.as_ref().is_some_and(|e| !e.is_empty()), "extensions");
            observe(c.snippets.as_ref().is_some_and(|s| !s.is_empty()), "snippets");
            observe(c.tasks.is_some(), "tasks");
            observe(c.launch.is_some(), "launch");
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitions_are_disjoint() {
        for table in [
            &*KIRO_TO_CLAUDE_CODE,
            &*CLAUDE_CODE_TO_KIRO,
            &*CLAUDE_CODE_TO_CURSOR,
            &*CURSOR_TO_CLAUDE_CODE,
        ] {
            for feature in table.direct_mappings.keys() {
                assert!(!table.approximations.contains_key(feature));
                assert!(!table.unsupported.contains(feature));
            }
            for feature in table.approximations.keys() {
                assert!(!table.unsupported.contains(feature));
            }
        }
    }

    #[test]
    fn test_unknown_feature_is_unsupported() {
        assert_eq!(
            KIRO_TO_CLAUDE_CODE.classify("telepathy"),
            FeatureSupport::Unsupported
        );
        assert_eq!(
            KIRO_TO_CLAUDE_CODE.classify("specs"),
            FeatureSupport::Direct("commands")
        );
    }

    #[test]
    fn test_support_levels() {
        assert_eq!(Confidence::High.support_level(), 80);
        assert_eq!(Confidence::Medium.support_level(), 60);
        assert_eq!(Confidence::Low.support_level(), 30);
    }
}
