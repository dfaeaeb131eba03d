//! Platform builders, converters and deployment for taptik.
//!
//! Builders read one IDE's project files into a [`TaptikContext`] and render
//! them back. Converter strategies map a context between platforms with
//! explicit direct/approximate/unsupported bookkeeping, and the registry
//! chains them when no direct pair exists. The deployment writer puts the
//! result on disk under a merge policy.
//!
//! # Examples
//!
//! ```
//! use taptik_core::{KiroConfig, Platform, PlatformConfig, SteeringRule, TaptikContext};
//! use taptik_sync::StrategyRegistry;
//!
//! let context = TaptikContext::builder("demo")
//!     .platform_config(PlatformConfig::Kiro(KiroConfig {
//!         steering_rules: Some(vec![SteeringRule {
//!             name: "tech".into(),
//!             content: "Rust 2021".into(),
//!             ..Default::default()
//!         }]),
//!         ..Default::default()
//!     }))
//!     .build();
//!
//! let registry = StrategyRegistry::with_defaults();
//! let report = registry
//!     .validate_compatibility(&context, Platform::Kiro, Platform::ClaudeCode)
//!     .unwrap();
//! assert_eq!(report.score, 100);
//!
//! let outcome = registry.convert(&context, Platform::Kiro, Platform::Cursor);
//! assert!(outcome.success);
//! assert!(outcome.context.unwrap().has_source_configuration(Platform::Cursor));
//! ```
//!
//! [`TaptikContext`]: taptik_core::TaptikContext

#![deny(unsafe_code)]

pub type Error = taptik_core::TaptikError;
pub type Result<T> = taptik_core::Result<T>;

pub mod builders;
pub mod converters;
pub mod deploy;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod writer;

pub use builders::{
    build_for, detect_platforms, render_for, ClaudeCodeBuilder, CursorBuilder, KiroBuilder,
    PlatformBuilder,
};
pub use converters::{
    CompatibilityReport, Confidence, ConversionOutcome, ConverterStrategy, FeatureMapping,
};
pub use deploy::{deploy_context, scan_planned};
pub use pipeline::{DeployOutcome, Pipeline, PipelineReport, PipelineRequest, Stage};
pub use registry::{ConversionKey, StrategyRegistry};
pub use report::{DeployResult, SkipReason};
pub use writer::{DeploymentFileWriter, MergePolicy, PlannedFile};
