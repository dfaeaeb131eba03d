//! Compatibility scoring for a converter pair over an actual payload.

use super::mapping::{FeatureMapping, FeatureSupport};
use serde::Serialize;

/// Minimum score for a conversion to be reported as compatible.
pub const COMPATIBILITY_THRESHOLD: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialSupport {
    pub feature: String,
    pub support_level: u32,
    pub notes: String,
}

/// How much of a source payload survives a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    pub compatible: bool,
    pub score: u32,
    pub supported_features: Vec<String>,
    pub unsupported_features: Vec<String>,
    pub partial_support: Vec<PartialSupport>,
}

impl CompatibilityReport {
    /// Report for a source with nothing to convert.
    pub fn empty() -> Self {
        Self {
            compatible: false,
            score: 0,
            supported_features: Vec::new(),
            unsupported_features: Vec::new(),
            partial_support: Vec::new(),
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "score {} ({}): {} supported, {} partial, {} unsupported",
            self.score,
            if self.compatible { "compatible" } else { "incompatible" },
            self.supported_features.len(),
            self.partial_support.len(),
            self.unsupported_features.len()
        )
    }
}

/// `round((100 * supported + sum(partial levels)) / observed)`; zero observed scores 0.
pub fn compatibility_score(supported: usize, partial_levels: &[u32], unsupported: usize) -> u32 {
    let observed = supported + partial_levels.len() + unsupported;
    if observed == 0 {
        return 0;
    }
    let total = 100 * supported as u64 + partial_levels.iter().map(|&l| u64::from(l)).sum::<u64>();
    (total as f64 / observed as f64).round() as u32
}

/// Classifies each observed feature against `mapping` and scores the result.
pub fn assess(mapping: &FeatureMapping, observed: &[&str]) -> CompatibilityReport {
    let mut report = CompatibilityReport::empty();
    for feature in observed {
        match mapping.classify(feature) {
            FeatureSupport::Direct(_) => report.supported_features.push(feature.to_string()),
            FeatureSupport::Approximate(approx) => report.partial_support.push(PartialSupport {
                feature: feature.to_string(),
                support_level: approx.confidence.support_level(),
                notes: approx.notes.to_string(),
            }),
            FeatureSupport::Unsupported => report.unsupported_features.push(feature.to_string()),
        }
    }
    let levels: Vec<u32> = report
        .partial_support
        .iter()
        .map(|p| p.support_level)
        .collect();
    report.score = compatibility_score(
        report.supported_features.len(),
        &levels,
        report.unsupported_features.len(),
    );
    report.compatible = report.score >= COMPATIBILITY_THRESHOLD;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::mapping::KIRO_TO_CLAUDE_CODE;
    use proptest::prelude::*;

    #[test]
    fn test_score_formula() {
        assert_eq!(compatibility_score(2, &[60, 60], 0), 70);
        assert_eq!(compatibility_score(3, &[60], 1), 72);
        assert_eq!(compatibility_score(0, &[], 0), 0);
        assert_eq!(compatibility_score(0, &[], 3), 0);
    }

    #[test]
    fn test_two_direct_one_high_one_dropped_scores_seventy() {
        let score = compatibility_score(2, &[80], 1);
        assert_eq!(score, 70);
        assert!(score >= COMPATIBILITY_THRESHOLD);
    }

    #[test]
    fn test_assess_partitions_observed_features() {
        let report = assess(
            &KIRO_TO_CLAUDE_CODE,
            &["specs", "steering_rules", "hooks", "mcp_servers", "task_templates"],
        );
        assert_eq!(report.score, 72);
        assert!(report.compatible);
        assert_eq!(report.supported_features, ["specs", "steering_rules", "mcp_servers"]);
        assert_eq!(report.unsupported_features, ["task_templates"]);
        assert_eq!(report.partial_support.len(), 1);
        assert_eq!(report.partial_support[0].feature, "hooks");
        assert_eq!(report.partial_support[0].support_level, 60);
    }

    #[test]
    fn test_unlisted_feature_counts_as_unsupported() {
        let report = assess(&KIRO_TO_CLAUDE_CODE, &["specs", "mystery"]);
        assert_eq!(report.score, 50);
        assert!(!report.compatible);
        assert_eq!(report.unsupported_features, ["mystery"]);
    }

    proptest! {
        #[test]
        fn score_stays_within_bounds(
            supported in 0usize..20,
            levels in proptest::collection::vec(prop_oneof![Just(30u32), Just(60), Just(80)], 0..20),
            unsupported in 0usize..20,
        ) {
            let score = compatibility_score(supported, &levels, unsupported);
            prop_assert!(score <= 100);
            if unsupported == 0 && levels.is_empty() && supported > 0 {
                prop_assert_eq!(score, 100);
            }
        }
    }
}
