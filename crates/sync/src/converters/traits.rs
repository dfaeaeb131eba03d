//! The converter strategy trait and its outcome types.

use super::compatibility::{assess, CompatibilityReport};
use super::mapping::{observed_features, Confidence, FeatureMapping, FeatureSupport};
use crate::builders::sections_for;
use crate::deploy::deploy_context;
use crate::report::DeployResult;
use crate::writer::MergePolicy;
use crate::Result;
use serde::Serialize;
use std::path::Path;
use taptik_core::{FileSystem, Platform, PlatformConfig, PlatformConfigRef, TaptikContext, TaptikError};
use tracing::{debug, info};

/// One source feature carried over with reduced fidelity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Approximation {
    pub feature: String,
    pub target: String,
    pub confidence: Confidence,
    pub notes: String,
}

/// Bookkeeping collected while a converter maps one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingNotes {
    pub warnings: Vec<String>,
    pub unsupported: Vec<String>,
    pub approximations: Vec<Approximation>,
}

impl MappingNotes {
    /// Records how `feature` is carried according to `mapping`.
    pub fn classify(&mut self, mapping: &FeatureMapping, target: Platform, feature: &str) {
        match mapping.classify(feature) {
            FeatureSupport::Direct(_) => {}
            FeatureSupport::Approximate(approx) => self.approximations.push(Approximation {
                feature: feature.to_string(),
                target: approx.target.to_string(),
                confidence: approx.confidence,
                notes: approx.notes.to_string(),
            }),
            FeatureSupport::Unsupported => {
                self.unsupported.push(feature.to_string());
                self.warnings.push(format!(
                    "{feature} has no {} equivalent and was dropped",
                    target.display_name()
                ));
            }
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Result of one conversion. `context` is present exactly when `success` is.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub success: bool,
    pub context: Option<TaptikContext>,
    pub error: Option<TaptikError>,
    pub warnings: Vec<String>,
    pub unsupported_features: Vec<String>,
    pub approximations: Vec<Approximation>,
}

impl ConversionOutcome {
    pub fn succeeded(context: TaptikContext, notes: MappingNotes) -> Self {
        Self {
            success: true,
            context: Some(context),
            error: None,
            warnings: notes.warnings,
            unsupported_features: notes.unsupported,
            approximations: notes.approximations,
        }
    }

    pub fn failed(error: TaptikError) -> Self {
        Self {
            success: false,
            context: None,
            error: Some(error),
            warnings: Vec::new(),
            unsupported_features: Vec::new(),
            approximations: Vec::new(),
        }
    }

    pub fn into_result(self) -> Result<TaptikContext> {
        match (self.context, self.error) {
            (Some(context), _) => Ok(context),
            (None, Some(error)) => Err(error),
            (None, None) => Err(TaptikError::Serialization(
                "conversion produced neither a context nor an error".to_string(),
            )),
        }
    }
}

/// Maps one platform's payload onto another's.
///
/// Implementors supply [`translate`](ConverterStrategy::translate) and the
/// feature table; conversion bookkeeping, scoring and deployment are shared.
pub trait ConverterStrategy: Send + Sync {
    fn source(&self) -> Platform;

    fn target(&self) -> Platform;

    fn can_convert(&self) -> bool {
        true
    }

    fn feature_mapping(&self) -> &'static FeatureMapping;

    /// Pure mapping from the source payload to the target payload.
    ///
    /// Unsupported and approximated features are already recorded in `notes`
    /// from the feature table; implementors add warnings for anything else
    /// they drop.
    fn translate(&self, source: PlatformConfigRef<'_>, notes: &mut MappingNotes) -> Result<PlatformConfig>;

    /// Produces a new context carrying the target payload.
    ///
    /// The source payload stays in the `ide` section; the neutral sections
    /// are re-derived from the target payload.
    fn convert(&self, context: &TaptikContext) -> ConversionOutcome {
        let (source, target) = (self.source(), self.target());
        if !self.can_convert() {
            return ConversionOutcome::failed(TaptikError::UnsupportedConversion {
                from: source,
                to: target,
            });
        }
        let Some(config) = context.platform_config(source).filter(|c| !c.is_empty()) else {
            return ConversionOutcome::failed(TaptikError::NoSourceConfiguration { platform: source });
        };

        let mut notes = MappingNotes::default();
        for feature in observed_features(config) {
            notes.classify(self.feature_mapping(), target, feature);
        }
        let translated = match self.translate(config, &mut notes) {
            Ok(translated) => translated,
            Err(err) => return ConversionOutcome::failed(err),
        };

        let sections = sections_for(&translated);
        let converted = sections
            .apply(context.to_builder().platform_config(translated))
            .platforms([target])
            .converted(source, target)
            .build();

        for warning in &notes.warnings {
            debug!(from = %source, to = %target, "{warning}");
        }
        info!(
            from = %source,
            to = %target,
            warnings = notes.warnings.len(),
            unsupported = notes.unsupported.len(),
            approximated = notes.approximations.len(),
            "Converted context"
        );
        ConversionOutcome::succeeded(converted, notes)
    }

    /// Scores how much of the context's source payload this converter carries.
    fn validate_compatibility(&self, context: &TaptikContext) -> CompatibilityReport {
        match context.platform_config(self.source()) {
            Some(config) if !config.is_empty() => {
                assess(self.feature_mapping(), &observed_features(config))
            }
            _ => CompatibilityReport::empty(),
        }
    }

    /// Writes the target platform's files for `context` under `target_path`.
    ///
    /// A context that does not yet carry a target payload is converted first.
    fn deploy(
        &self,
        context: &TaptikContext,
        target_path: &Path,
        policy: MergePolicy,
        fs: &dyn FileSystem,
    ) -> DeployResult {
        if context.has_source_configuration(self.target()) {
            return deploy_context(self.target(), context, target_path, policy, fs);
        }
        match self.convert(context).into_result() {
            Ok(converted) => deploy_context(self.target(), &converted, target_path, policy, fs),
            Err(err) => DeployResult::failed(err),
        }
    }
}

/// Helper for implementors whose `translate` received another platform's payload.
pub(crate) fn wrong_source(expected: Platform) -> TaptikError {
    TaptikError::NoSourceConfiguration { platform: expected }
}
