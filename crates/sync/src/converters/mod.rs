//! Converter strategies between platform payloads.
//!
//! Each strategy maps one source platform to one target through a static
//! [`FeatureMapping`]; the registry chains them when no direct pair exists.

pub mod claude_cursor;
pub mod claude_kiro;
pub mod compatibility;
pub mod cursor_claude;
pub mod kiro_claude;
pub mod mapping;
pub mod sections;
pub mod traits;

pub use claude_cursor::ClaudeCodeToCursor;
pub use claude_kiro::ClaudeCodeToKiro;
pub use compatibility::{assess, compatibility_score, CompatibilityReport, PartialSupport};
pub use cursor_claude::CursorToClaudeCode;
pub use kiro_claude::KiroToClaudeCode;
pub use mapping::{observed_features, ApproximateMapping, Confidence, FeatureMapping};
pub use traits::{Approximation, ConversionOutcome, ConverterStrategy, MappingNotes};
