//! Content security validation for IDE rules, context files and prompts.
//!
//! Everything here is a pure function over strings and JSON values: secret
//! and malicious-content scanning, prompt-injection scoring, and per-kind
//! size budgets. Matched text is masked before it is stored in a finding.
//!
//! # Example
//!
//! ```rust
//! use taptik_validate::{validate_content, ContentBundle, ContentKind, SizeLimits};
//!
//! let bundle = ContentBundle::new()
//!     .with(ContentKind::Rule, "style", "Prefer iterators over index loops.")
//!     .with(ContentKind::Prompt, "review", "Review the diff for panics.");
//!
//! let result = validate_content(&bundle, &SizeLimits::default());
//! assert!(result.valid);
//! assert_eq!(result.statistics.rule_count, 1);
//! ```

pub mod common;
pub mod injection;
pub mod limits;
pub mod mask;
pub mod patterns;
pub mod scan;

pub use common::{
    ContentBundle, ContentError, ContentItem, ContentKind, ContentStatistics,
    ContentValidationResult, FindingCategory, InjectionReport, SecurityFinding, Severity,
    SizeIssue, SizeIssueKind,
};
pub use injection::{detect_prompt_injection, MAX_RISK_SCORE};
pub use limits::SizeLimits;
pub use mask::mask_sensitive;
pub use scan::{
    scan_injection, scan_json, scan_json_injection, scan_malicious, scan_sensitive, scan_text,
};

use tracing::debug;

/// Validates every item of `bundle` against the catalogs and `limits`.
///
/// Security findings (including prompt-injection attempts) always make the
/// result invalid; they are never downgraded to warnings.
pub fn validate_content(bundle: &ContentBundle, limits: &SizeLimits) -> ContentValidationResult {
    let mut result = ContentValidationResult {
        valid: true,
        errors: Vec::new(),
        warnings: Vec::new(),
        security_issues: Vec::new(),
        size_issues: limits.check(bundle),
        injection: InjectionReport::default(),
        statistics: ContentStatistics {
            total_bytes: bundle.total_bytes(),
            rule_count: bundle.rules.len(),
            context_count: bundle.contexts.len(),
            prompt_count: bundle.prompts.len(),
            ..Default::default()
        },
    };

    for (kind, item) in bundle.items() {
        if item.id.trim().is_empty() {
            result.errors.push(ContentError {
                item: String::new(),
                message: format!("{} item has no identifier", kind.as_str()),
            });
        }
        if item.content.trim().is_empty() {
            result
                .warnings
                .push(format!("{} '{}' is empty", kind.as_str(), item.id));
            continue;
        }

        let location = format!("{}/{}", kind.as_str(), item.id);
        result
            .security_issues
            .extend(scan_text(&item.content, &location));

        let injection = detect_prompt_injection(&item.content, &location);
        result
            .security_issues
            .extend(injection.injection_attempts.iter().cloned());
        result.injection.absorb(injection);
    }

    let result = result.finish();
    debug!(
        valid = result.valid,
        findings = result.statistics.finding_count,
        size_issues = result.size_issues.len(),
        risk = result.statistics.risk_score,
        "Validated content bundle"
    );
    result
}
