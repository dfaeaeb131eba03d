//! Common types for content security validation.

use serde::{Deserialize, Serialize};

/// Severity level for security and size issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Contribution of one prompt-injection match to the risk score.
    pub fn risk_weight(&self) -> u32 {
        match self {
            Self::Critical => 40,
            Self::High => 25,
            Self::Medium => 10,
            Self::Low => 5,
        }
    }
}

/// Which catalog produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    SensitiveData,
    MaliciousContent,
    Injection,
}

/// One detected instance of sensitive, malicious, or injection-risk content.
///
/// `redacted_evidence` is always masked; the matched text itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub category: FindingCategory,
    pub severity: Severity,
    pub pattern_name: String,
    /// `<location>:<line>` for text, dotted JSON path for structured data.
    pub location: String,
    pub redacted_evidence: String,
    pub mitigation: String,
}

/// Outcome of a prompt-injection scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionReport {
    /// True when no injection attempt was found.
    pub safe: bool,
    pub injection_attempts: Vec<SecurityFinding>,
    /// Sum of per-pattern weights, capped at 100.
    pub risk_score: u32,
}

impl Default for InjectionReport {
    fn default() -> Self {
        Self {
            safe: true,
            injection_attempts: Vec::new(),
            risk_score: 0,
        }
    }
}

/// Kind of content, each with its own byte limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Short rule documents (steering rules, cursor rules, commands).
    Rule,
    /// Long free-text context (instruction files, specs).
    Context,
    /// Small prompt snippets (hook prompts, templates).
    Prompt,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Context => "context",
            Self::Prompt => "prompt",
        }
    }
}

/// A named piece of content to validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub content: String,
}

/// Everything one validation pass looks at, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBundle {
    pub rules: Vec<ContentItem>,
    pub contexts: Vec<ContentItem>,
    pub prompts: Vec<ContentItem>,
}

impl ContentBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ContentKind, id: impl Into<String>, content: impl Into<String>) {
        let item = ContentItem {
            id: id.into(),
            content: content.into(),
        };
        match kind {
            ContentKind::Rule => self.rules.push(item),
            ContentKind::Context => self.contexts.push(item),
            ContentKind::Prompt => self.prompts.push(item),
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, kind: ContentKind, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.push(kind, id, content);
        self
    }

    /// All items tagged with their kind.
    pub fn items(&self) -> impl Iterator<Item = (ContentKind, &ContentItem)> {
        self.rules
            .iter()
            .map(|i| (ContentKind::Rule, i))
            .chain(self.contexts.iter().map(|i| (ContentKind::Context, i)))
            .chain(self.prompts.iter().map(|i| (ContentKind::Prompt, i)))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.contexts.is_empty() && self.prompts.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.items().map(|(_, i)| i.content.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeIssueKind {
    SizeExceeded,
    TotalSizeExceeded,
    CountExceeded,
}

/// A size or count budget that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeIssue {
    pub kind: SizeIssueKind,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_kind: Option<ContentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    pub current: usize,
    pub limit: usize,
    pub message: String,
}

/// A problem with the content that is neither a security nor a size issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentError {
    pub item: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStatistics {
    pub total_bytes: usize,
    pub rule_count: usize,
    pub context_count: usize,
    pub prompt_count: usize,
    pub finding_count: usize,
    pub risk_score: u32,
}

/// Aggregate outcome of [`crate::validate_content`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentValidationResult {
    /// True only when `errors`, `security_issues` and `size_issues` are all empty.
    pub valid: bool,
    pub errors: Vec<ContentError>,
    pub warnings: Vec<String>,
    pub security_issues: Vec<SecurityFinding>,
    pub size_issues: Vec<SizeIssue>,
    pub injection: InjectionReport,
    pub statistics: ContentStatistics,
}

impl ContentValidationResult {
    pub(crate) fn finish(mut self) -> Self {
        self.valid =
            self.errors.is_empty() && self.security_issues.is_empty() && self.size_issues.is_empty();
        self.statistics.finding_count = self.security_issues.len();
        self.statistics.risk_score = self.injection.risk_score;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Critical.risk_weight() > Severity::Low.risk_weight());
    }

    #[test]
    fn test_bundle_items_keep_kind() {
        let bundle = ContentBundle::new()
            .with(ContentKind::Rule, "r", "abc")
            .with(ContentKind::Prompt, "p", "de");
        let kinds: Vec<_> = bundle.items().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![ContentKind::Rule, ContentKind::Prompt]);
        assert_eq!(bundle.total_bytes(), 5);
    }

    #[test]
    fn test_size_issue_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&SizeIssueKind::CountExceeded).unwrap(),
            "\"count_exceeded\""
        );
        assert_eq!(
            serde_json::to_string(&FindingCategory::SensitiveData).unwrap(),
            "\"sensitive_data\""
        );
    }
}
