//! One end-to-end run: detect, build, convert and deploy.
//!
//! ```text
//! Detected -> Extracted -> Normalized -> Validated{valid|invalid}
//!          -> Converted{ok|failed} -> Deployed{ok|partial|failed}
//! ```
//!
//! `Validated{invalid}` and `Converted{failed}` are terminal. The report
//! records the last stage reached alongside whatever each stage produced.

use crate::builders::{project_name, ClaudeCodeBuilder, CursorBuilder, KiroBuilder, PlatformBuilder};
use crate::converters::ConversionOutcome;
use crate::deploy::deploy_context;
use crate::registry::StrategyRegistry;
use crate::report::DeployResult;
use crate::writer::MergePolicy;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use taptik_core::{FileSystem, Platform, TaptikContext, TaptikError, ValidationResult};
use taptik_validate::SizeLimits;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployOutcome {
    Ok,
    Partial,
    Failed,
}

impl From<&DeployResult> for DeployOutcome {
    fn from(result: &DeployResult) -> Self {
        if !result.success {
            Self::Failed
        } else if result.is_partial() {
            Self::Partial
        } else {
            Self::Ok
        }
    }
}

/// Last stage a run reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    NotDetected,
    Detected,
    Extracted,
    Normalized,
    Validated { valid: bool },
    Converted { ok: bool },
    Deployed { outcome: DeployOutcome },
}

impl Stage {
    /// True for stages that end the run unsuccessfully.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NotDetected
                | Self::Validated { valid: false }
                | Self::Converted { ok: false }
                | Self::Deployed {
                    outcome: DeployOutcome::Failed
                }
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDetected => f.write_str("not detected"),
            Self::Detected => f.write_str("detected"),
            Self::Extracted => f.write_str("extracted"),
            Self::Normalized => f.write_str("normalized"),
            Self::Validated { valid: true } => f.write_str("validated (valid)"),
            Self::Validated { valid: false } => f.write_str("validated (invalid)"),
            Self::Converted { ok: true } => f.write_str("converted"),
            Self::Converted { ok: false } => f.write_str("conversion failed"),
            Self::Deployed { outcome } => match outcome {
                DeployOutcome::Ok => f.write_str("deployed"),
                DeployOutcome::Partial => f.write_str("deployed (partial)"),
                DeployOutcome::Failed => f.write_str("deployment failed"),
            },
        }
    }
}

/// What to run. A missing `source` is detected; a missing `target` stops after validation.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub root: PathBuf,
    pub source: Option<Platform>,
    pub target: Option<Platform>,
    /// Directory to write the target's files into.
    pub deploy_to: Option<PathBuf>,
    pub policy: MergePolicy,
}

impl PipelineRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source: None,
            target: None,
            deploy_to: None,
            policy: MergePolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub stage: Stage,
    pub source: Option<Platform>,
    /// Latest context produced (built, then converted).
    pub context: Option<TaptikContext>,
    pub validation: Option<ValidationResult>,
    pub conversion: Option<ConversionOutcome>,
    pub deployment: Option<DeployResult>,
    pub error: Option<TaptikError>,
}

impl PipelineReport {
    fn new(source: Option<Platform>) -> Self {
        Self {
            stage: Stage::NotDetected,
            source,
            context: None,
            validation: None,
            conversion: None,
            deployment: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.stage.is_failure()
    }
}

pub struct Pipeline<'a> {
    fs: &'a dyn FileSystem,
    registry: &'a StrategyRegistry,
    limits: SizeLimits,
}

impl<'a> Pipeline<'a> {
    pub fn new(fs: &'a dyn FileSystem, registry: &'a StrategyRegistry) -> Self {
        Self {
            fs,
            registry,
            limits: SizeLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn run(&self, request: &PipelineRequest) -> PipelineReport {
        let source = request
            .source
            .or_else(|| crate::builders::detect_platforms(self.fs, &request.root).into_iter().next());
        let mut report = PipelineReport::new(source);
        let Some(source) = source else {
            warn!(root = %request.root.display(), "No supported platform detected");
            report.error = Some(TaptikError::NoPlatformDetected {
                path: request.root.clone(),
            });
            return report;
        };

        let built = match source {
            Platform::ClaudeCode => self.build_stages(
                ClaudeCodeBuilder::new(self.fs).with_limits(self.limits),
                &request.root,
                &mut report,
            ),
            Platform::Kiro => self.build_stages(
                KiroBuilder::new(self.fs).with_limits(self.limits),
                &request.root,
                &mut report,
            ),
            Platform::Cursor => self.build_stages(
                CursorBuilder::new(self.fs).with_limits(self.limits),
                &request.root,
                &mut report,
            ),
        };
        let Some(mut context) = built else {
            return report;
        };

        if let Some(target) = request.target {
            let outcome = self.registry.convert(&context, source, target);
            report.stage = Stage::Converted { ok: outcome.success };
            match outcome.context.clone() {
                Some(converted) => context = converted,
                None => {
                    report.error = outcome.error.clone();
                    report.conversion = Some(outcome);
                    report.context = Some(context);
                    return report;
                }
            }
            report.conversion = Some(outcome);
        }

        if let Some(dir) = &request.deploy_to {
            let platform = request.target.unwrap_or(source);
            let result = deploy_context(platform, &context, dir, request.policy, self.fs);
            report.stage = Stage::Deployed {
                outcome: DeployOutcome::from(&result),
            };
            if !result.success {
                report.error = result.errors.first().cloned();
            }
            report.deployment = Some(result);
        }

        info!(root = %request.root.display(), source = %source, stage = %report.stage, "Pipeline finished");
        report.context = Some(context);
        report
    }

    /// Runs the builder stages one at a time, recording each in `report`.
    fn build_stages<B: PlatformBuilder>(
        &self,
        builder: B,
        root: &Path,
        report: &mut PipelineReport,
    ) -> Option<TaptikContext> {
        if let Err(err) = builder.require_detected(root) {
            report.error = Some(err);
            return None;
        }
        report.stage = Stage::Detected;

        let raw = match builder.extract(root) {
            Ok(raw) => raw,
            Err(err) => {
                report.error = Some(err);
                return None;
            }
        };
        report.stage = Stage::Extracted;

        let (raw, dropped) = builder.sanitize(raw);
        let context = builder.normalize(&raw, &project_name(root));
        report.stage = Stage::Normalized;

        let mut validation = ValidationResult::new();
        for warning in dropped {
            validation.add_warning(warning);
        }
        validation.merge(builder.validate(&context));
        let valid = validation.valid;
        report.stage = Stage::Validated { valid };
        if !valid {
            report.error = Some(TaptikError::ValidationFailed {
                platform: builder.platform(),
                errors: validation.errors.clone(),
            });
            report.validation = Some(validation);
            return None;
        }
        report.validation = Some(validation);
        report.context = Some(context.clone());
        Some(context)
    }
}
