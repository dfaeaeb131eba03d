//! Canonical model for taptik IDE configuration conversion.
//!
//! Every platform builder reads a project into a [`TaptikContext`] and every
//! converter maps one context to another. This crate holds that shared
//! schema, the per-platform payload shapes, the structural validation types,
//! the error taxonomy, and the [`FileSystem`] collaborator the pipeline does
//! its I/O through.
//!
//! # Examples
//!
//! ```
//! use taptik_core::{KiroConfig, Platform, PlatformConfig, SteeringRule, TaptikContext};
//!
//! let context = TaptikContext::builder("my-project")
//!     .platform_config(PlatformConfig::Kiro(KiroConfig {
//!         steering_rules: Some(vec![SteeringRule {
//!             name: "tech".into(),
//!             content: "Rust 2021, tokio".into(),
//!             ..Default::default()
//!         }]),
//!         ..Default::default()
//!     }))
//!     .build();
//!
//! assert!(context.has_source_configuration(Platform::Kiro));
//! assert!(context.project.is_none());
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod platform;
pub mod validation;

pub use config::{
    ClaudeCodeConfig, ClaudeHookCommand, ClaudeHookMatcher, ClaudePermissions, ClaudeSettings,
    CursorConfig, CursorRule, HookAction, HookActionKind, HookEvent, HookTrigger, KiroConfig,
    KiroHook, KiroSpec, McpServer, McpTransport, PlatformConfig, PlatformConfigRef,
    SteeringInclusion, SteeringRule, TaskTemplate,
};
pub use context::{
    ContextBuilder, ContextMetadata, ConversionStamp, IdeData, PersonalData, ProjectData,
    PromptTemplate, PromptsData, Section, TaptikContext, ToolsData, CONTEXT_VERSION,
    SUPPORTED_VERSION_REQ,
};
pub use error::{Result, TaptikError};
pub use fs::{FileSystem, FsError, LocalFileSystem};
pub use platform::{ContextCategory, Platform, UnknownPlatform};
pub use validation::{ValidationError, ValidationResult, ValidationWarning};
