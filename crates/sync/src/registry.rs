//! Lookup of converter strategies by `(source, target)`, with chaining.

use crate::converters::{
    ClaudeCodeToCursor, ClaudeCodeToKiro, CompatibilityReport, ConversionOutcome,
    ConverterStrategy, CursorToClaudeCode, KiroToClaudeCode,
};
use crate::converters::compatibility::COMPATIBILITY_THRESHOLD;
use crate::report::DeployResult;
use crate::writer::MergePolicy;
use crate::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use taptik_core::{FileSystem, Platform, TaptikContext, TaptikError};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConversionKey {
    pub source: Platform,
    pub target: Platform,
}

impl fmt::Display for ConversionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Registered converters. Pairs without a direct converter are reached by
/// chaining through intermediate platforms (shortest chain first).
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<ConversionKey, Arc<dyn ConverterStrategy>>,
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("pairs", &self.pairs())
            .finish()
    }
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in converters for Kiro, Claude Code and Cursor.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(KiroToClaudeCode));
        registry.register(Arc::new(ClaudeCodeToKiro));
        registry.register(Arc::new(ClaudeCodeToCursor));
        registry.register(Arc::new(CursorToClaudeCode));
        registry
    }

    /// Adds a strategy, returning the one it replaced for the same pair.
    pub fn register(
        &mut self,
        strategy: Arc<dyn ConverterStrategy>,
    ) -> Option<Arc<dyn ConverterStrategy>> {
        let key = ConversionKey {
            source: strategy.source(),
            target: strategy.target(),
        };
        debug!(pair = %key, "Registering converter");
        self.strategies.insert(key, strategy)
    }

    pub fn get(&self, source: Platform, target: Platform) -> Option<Arc<dyn ConverterStrategy>> {
        self.strategies
            .get(&ConversionKey { source, target })
            .filter(|s| s.can_convert())
            .cloned()
    }

    /// True when a direct or chained conversion exists.
    pub fn supports(&self, source: Platform, target: Platform) -> bool {
        self.find_chain(source, target).is_some()
    }

    /// Directly registered pairs, sorted.
    pub fn pairs(&self) -> Vec<ConversionKey> {
        let mut pairs: Vec<_> = self.strategies.keys().copied().collect();
        pairs.sort();
        pairs
    }

    /// Shortest sequence of converters from `source` to `target`.
    ///
    /// Neighbours are explored in [`Platform::ALL`] order so the chain is
    /// deterministic. A platform never converts to itself.
    pub fn find_chain(
        &self,
        source: Platform,
        target: Platform,
    ) -> Option<Vec<Arc<dyn ConverterStrategy>>> {
        if source == target {
            return None;
        }
        let mut previous: HashMap<Platform, Platform> = HashMap::new();
        let mut seen = HashSet::from([source]);
        let mut queue = VecDeque::from([source]);

        while let Some(current) = queue.pop_front() {
            if current == target {
                break;
            }
            for next in Platform::ALL {
                if !seen.contains(&next) && self.get(current, next).is_some() {
                    seen.insert(next);
                    previous.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        let mut hops = Vec::new();
        let mut cursor = target;
        while cursor != source {
            let from = *previous.get(&cursor)?;
            hops.push(self.get(from, cursor)?);
            cursor = from;
        }
        hops.reverse();
        Some(hops)
    }

    fn chain_or_error(
        &self,
        source: Platform,
        target: Platform,
    ) -> Result<Vec<Arc<dyn ConverterStrategy>>> {
        self.find_chain(source, target)
            .ok_or(TaptikError::UnsupportedConversion {
                from: source,
                to: target,
            })
    }

    /// Converts `context` from `source` to `target`, chaining when needed.
    ///
    /// A chained result carries the warnings, unsupported features and
    /// approximations of every hop and is stamped `source -> target`.
    pub fn convert(
        &self,
        context: &TaptikContext,
        source: Platform,
        target: Platform,
    ) -> ConversionOutcome {
        let chain = match self.chain_or_error(source, target) {
            Ok(chain) => chain,
            Err(err) => return ConversionOutcome::failed(err),
        };
        if chain.len() > 1 {
            let route: Vec<String> = chain.iter().map(|s| s.target().to_string()).collect();
            info!(from = %source, to = %target, via = %route.join(" -> "), "Chaining converters");
        }

        let mut current = context.clone();
        let mut combined: Option<ConversionOutcome> = None;
        for strategy in &chain {
            let outcome = strategy.convert(&current);
            let Some(next) = outcome.context.clone() else {
                return outcome;
            };
            current = next;
            combined = Some(match combined {
                None => outcome,
                Some(mut acc) => {
                    acc.warnings.extend(outcome.warnings);
                    acc.unsupported_features.extend(outcome.unsupported_features);
                    acc.approximations.extend(outcome.approximations);
                    acc
                }
            });
        }

        let Some(mut outcome) = combined else {
            return ConversionOutcome::failed(TaptikError::UnsupportedConversion {
                from: source,
                to: target,
            });
        };
        outcome.context = Some(current.to_builder().converted(source, target).build());
        outcome
    }

    /// Compatibility of `context`'s source payload with `target`.
    ///
    /// For a chain the features are classified by the first hop and the
    /// score is the lowest hop score, since loss compounds along the way.
    pub fn validate_compatibility(
        &self,
        context: &TaptikContext,
        source: Platform,
        target: Platform,
    ) -> Result<CompatibilityReport> {
        let chain = self.chain_or_error(source, target)?;
        let mut current = context.clone();
        let mut report: Option<CompatibilityReport> = None;
        for strategy in &chain {
            let hop = strategy.validate_compatibility(&current);
            report = Some(match report {
                None => hop,
                Some(mut first) => {
                    first.score = first.score.min(hop.score);
                    first
                }
            });
            match strategy.convert(&current).context {
                Some(next) => current = next,
                None => break,
            }
        }
        let mut report = report.unwrap_or_else(CompatibilityReport::empty);
        report.compatible = report.score >= COMPATIBILITY_THRESHOLD;
        Ok(report)
    }

    /// Converts (when needed) and writes `target`'s files under `root`.
    pub fn deploy(
        &self,
        context: &TaptikContext,
        source: Platform,
        target: Platform,
        root: &Path,
        policy: MergePolicy,
        fs: &dyn FileSystem,
    ) -> DeployResult {
        if context.has_source_configuration(target) {
            return crate::deploy::deploy_context(target, context, root, policy, fs);
        }
        match self.convert(context, source, target).into_result() {
            Ok(converted) => crate::deploy::deploy_context(target, &converted, root, policy, fs),
            Err(err) => DeployResult::failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pairs() {
        let registry = StrategyRegistry::with_defaults();
        let pairs: Vec<String> = registry.pairs().iter().map(ToString::to_string).collect();
        assert_eq!(
            pairs,
            [
                "claude-code -> kiro",
                "claude-code -> cursor",
                "kiro -> claude-code",
                "cursor -> claude-code",
            ]
        );
    }

    #[test]
    fn test_chain_through_claude_code() {
        let registry = StrategyRegistry::with_defaults();
        let chain = registry.find_chain(Platform::Kiro, Platform::Cursor).unwrap();
        let hops: Vec<_> = chain.iter().map(|s| (s.source(), s.target())).collect();
        assert_eq!(
            hops,
            [
                (Platform::Kiro, Platform::ClaudeCode),
                (Platform::ClaudeCode, Platform::Cursor)
            ]
        );
        assert!(registry.supports(Platform::Cursor, Platform::Kiro));
    }

    #[test]
    fn test_same_platform_and_empty_registry_are_unsupported() {
        let registry = StrategyRegistry::with_defaults();
        assert!(registry.find_chain(Platform::Kiro, Platform::Kiro).is_none());

        let empty = StrategyRegistry::new();
        let outcome = empty.convert(
            &TaptikContext::builder("x").build(),
            Platform::Kiro,
            Platform::Cursor,
        );
        assert!(matches!(
            outcome.error,
            Some(TaptikError::UnsupportedConversion { .. })
        ));
    }
}
