//! Per-kind byte limits and per-collection count limits.

use crate::common::{ContentBundle, ContentKind, Severity, SizeIssue, SizeIssueKind};
use serde::{Deserialize, Serialize};

/// Byte and count budgets for one validation pass.
///
/// The context limit is an order of magnitude above the rule limit and the
/// prompt limit sits below the rule limit; downstream tooling relies on that
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    pub max_rule_bytes: usize,
    pub max_context_bytes: usize,
    pub max_prompt_bytes: usize,
    pub max_total_bytes: usize,
    pub max_rules: usize,
    pub max_contexts: usize,
    pub max_prompts: usize,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            max_rule_bytes: 1_024,
            max_context_bytes: 10_240,
            max_prompt_bytes: 512,
            max_total_bytes: 1_048_576,
            max_rules: 100,
            max_contexts: 50,
            max_prompts: 200,
        }
    }
}

impl SizeLimits {
    pub fn item_limit(&self, kind: ContentKind) -> usize {
        match kind {
            ContentKind::Rule => self.max_rule_bytes,
            ContentKind::Context => self.max_context_bytes,
            ContentKind::Prompt => self.max_prompt_bytes,
        }
    }

    pub fn count_limit(&self, kind: ContentKind) -> usize {
        match kind {
            ContentKind::Rule => self.max_rules,
            ContentKind::Context => self.max_contexts,
            ContentKind::Prompt => self.max_prompts,
        }
    }

    /// Severity of a single item over its byte limit.
    pub fn excess_severity(kind: ContentKind) -> Severity {
        match kind {
            ContentKind::Context => Severity::High,
            ContentKind::Rule | ContentKind::Prompt => Severity::Medium,
        }
    }

    /// Every size and count issue in `bundle`.
    pub fn check(&self, bundle: &ContentBundle) -> Vec<SizeIssue> {
        let mut issues = Vec::new();

        for (kind, item) in bundle.items() {
            let limit = self.item_limit(kind);
            let size = item.content.len();
            if size > limit {
                issues.push(SizeIssue {
                    kind: SizeIssueKind::SizeExceeded,
                    severity: Self::excess_severity(kind),
                    content_kind: Some(kind),
                    item: Some(item.id.clone()),
                    current: size,
                    limit,
                    message: format!(
                        "{} '{}' is {size} bytes, limit is {limit}",
                        kind.as_str(),
                        item.id
                    ),
                });
            }
        }

        for (kind, count) in [
            (ContentKind::Rule, bundle.rules.len()),
            (ContentKind::Context, bundle.contexts.len()),
            (ContentKind::Prompt, bundle.prompts.len()),
        ] {
            let limit = self.count_limit(kind);
            if count > limit {
                issues.push(SizeIssue {
                    kind: SizeIssueKind::CountExceeded,
                    severity: Severity::High,
                    content_kind: Some(kind),
                    item: None,
                    current: count,
                    limit,
                    message: format!("{count} {} items, limit is {limit}", kind.as_str()),
                });
            }
        }

        let total = bundle.total_bytes();
        if total > self.max_total_bytes {
            issues.push(SizeIssue {
                kind: SizeIssueKind::TotalSizeExceeded,
                severity: Severity::High,
                content_kind: None,
                item: None,
                current: total,
                limit: self.max_total_bytes,
                message: format!(
                    "total content is {total} bytes, limit is {}",
                    self.max_total_bytes
                ),
            });
        }

        issues
    }
}
