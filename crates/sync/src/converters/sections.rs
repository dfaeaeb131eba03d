//! Named sections embedded in one markdown document.
//!
//! Platforms with a single instruction file (CLAUDE.md, `.cursorrules`) carry
//! several rules as sections. Each section starts on a marker line:
//!
//! ```text
//! <!-- taptik:rule {"name":"tech","inclusion":"always"} -->
//! ```
//!
//! Text before the first marker is the preamble. Documents without markers
//! decode to a preamble only, so hand-written files pass through untouched.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::LazyLock;
use taptik_core::{CursorRule, SteeringInclusion, SteeringRule};
use tracing::warn;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!-- taptik:([a-z][a-z_-]*) (\{.*\}) -->$").expect("valid regex")
});

pub const RULE_KIND: &str = "rule";
pub const SPEC_KIND: &str = "spec";

/// Steering rule name that stands for the preamble of an instruction file.
pub const PREAMBLE_RULE: &str = "claude-instructions";

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedSection {
    pub kind: String,
    pub meta: Value,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionedDocument {
    pub preamble: String,
    pub sections: Vec<EmbeddedSection>,
}

/// Metadata of a `rule` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleMeta {
    pub name: String,
    #[serde(default)]
    pub inclusion: SteeringInclusion,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub globs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kiro `fileMatchPattern` exactly as written, when `globs` alone would
    /// not reproduce it (spacing after commas, empty entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl EmbeddedSection {
    pub fn rule(meta: &RuleMeta, body: impl Into<String>) -> Self {
        Self {
            kind: RULE_KIND.to_string(),
            meta: serde_json::to_value(meta).unwrap_or(Value::Null),
            body: body.into(),
        }
    }

    pub fn spec(document: &str, body: impl Into<String>) -> Self {
        Self {
            kind: SPEC_KIND.to_string(),
            meta: json!({ "document": document }),
            body: body.into(),
        }
    }

    /// Marks a command as a spec with no documents.
    pub fn spec_identity(name: &str) -> Self {
        Self {
            kind: SPEC_KIND.to_string(),
            meta: json!({ "name": name }),
            body: String::new(),
        }
    }

    pub fn as_rule(&self) -> Option<RuleMeta> {
        if self.kind != RULE_KIND {
            return None;
        }
        serde_json::from_value(self.meta.clone()).ok()
    }

    pub fn spec_document(&self) -> Option<&str> {
        if self.kind != SPEC_KIND {
            return None;
        }
        self.meta.get("document").and_then(Value::as_str)
    }

    pub fn spec_name(&self) -> Option<&str> {
        if self.kind != SPEC_KIND {
            return None;
        }
        self.meta.get("name").and_then(Value::as_str)
    }

    fn marker(&self) -> String {
        // '>' only occurs inside JSON strings, where the escape is equivalent.
        let meta = self.meta.to_string().replace('>', "\\u003e");
        format!("<!-- taptik:{} {} -->", self.kind, meta)
    }
}

/// Preamble, then one marker line and body per section.
pub fn encode(preamble: &str, sections: &[EmbeddedSection]) -> String {
    let mut out = preamble.to_string();
    if !preamble.is_empty() && !sections.is_empty() {
        out.push('\n');
    }
    for section in sections {
        out.push_str(&section.marker());
        out.push('\n');
        out.push_str(&section.body);
        out.push('\n');
    }
    out
}

/// Inverse of [`encode`]. Marker lines with unparseable metadata stay body text.
pub fn decode(document: &str) -> SectionedDocument {
    let mut preamble = String::new();
    let mut sections: Vec<EmbeddedSection> = Vec::new();

    for line in document.split_inclusive('\n') {
        if let Some(section) = parse_marker(line.trim_end_matches(['\n', '\r'])) {
            sections.push(section);
            continue;
        }
        match sections.last_mut() {
            Some(current) => current.body.push_str(line),
            None => preamble.push_str(line),
        }
    }

    if sections.is_empty() {
        return SectionedDocument {
            preamble,
            sections,
        };
    }
    strip_separator(&mut preamble);
    for section in &mut sections {
        strip_separator(&mut section.body);
    }
    SectionedDocument {
        preamble,
        sections,
    }
}

fn strip_separator(text: &mut String) {
    if text.ends_with('\n') {
        text.pop();
    }
}

fn parse_marker(line: &str) -> Option<EmbeddedSection> {
    let caps = MARKER.captures(line)?;
    match serde_json::from_str(&caps[2]) {
        Ok(meta) => Some(EmbeddedSection {
            kind: caps[1].to_string(),
            meta,
            body: String::new(),
        }),
        Err(err) => {
            warn!(error = %err, "Ignoring section marker with invalid metadata");
            None
        }
    }
}

/// Splits a comma-separated glob list; `None` for an absent or empty pattern.
pub fn split_globs(pattern: Option<&str>) -> Vec<String> {
    pattern
        .map(|p| {
            p.split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn join_globs(globs: &[String]) -> Option<String> {
    (!globs.is_empty()).then(|| globs.join(","))
}

impl From<&SteeringRule> for RuleMeta {
    fn from(rule: &SteeringRule) -> Self {
        let globs = split_globs(rule.file_match_pattern.as_deref());
        let pattern = rule
            .file_match_pattern
            .clone()
            .filter(|p| join_globs(&globs).as_deref() != Some(p.as_str()));
        Self {
            name: rule.name.clone(),
            inclusion: rule.inclusion,
            globs,
            description: None,
            pattern,
        }
    }
}

impl From<&CursorRule> for RuleMeta {
    fn from(rule: &CursorRule) -> Self {
        let inclusion = if rule.always_apply {
            SteeringInclusion::Always
        } else if !rule.globs.is_empty() {
            SteeringInclusion::FileMatch
        } else {
            SteeringInclusion::Manual
        };
        Self {
            name: rule.name.clone(),
            inclusion,
            globs: rule.globs.clone(),
            description: rule.description.clone(),
            pattern: None,
        }
    }
}

impl RuleMeta {
    pub fn into_steering_rule(self, content: String) -> SteeringRule {
        SteeringRule {
            file_match_pattern: self.pattern.or_else(|| join_globs(&self.globs)),
            name: self.name,
            content,
            inclusion: self.inclusion,
        }
    }

    pub fn into_cursor_rule(self, content: String) -> CursorRule {
        CursorRule {
            always_apply: self.inclusion == SteeringInclusion::Always,
            name: self.name,
            content,
            description: self.description,
            globs: self.globs,
        }
    }
}
