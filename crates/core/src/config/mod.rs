//! Per-platform configuration payloads.
//!
//! Each platform owns one closed shape. Unknown platform keys in the `ide`
//! section are carried through untouched by [`crate::context::IdeData::other`].

pub mod claude_code;
pub mod cursor;
pub mod kiro;
pub mod mcp;

pub use claude_code::{
    ClaudeCodeConfig, ClaudeHookCommand, ClaudeHookMatcher, ClaudePermissions, ClaudeSettings,
};
pub use cursor::{CursorConfig, CursorRule};
pub use kiro::{
    HookAction, HookActionKind, HookEvent, HookTrigger, KiroConfig, KiroHook, KiroSpec,
    SteeringInclusion, SteeringRule, TaskTemplate,
};
pub use mcp::{McpServer, McpTransport};

use crate::platform::Platform;

/// One platform's payload, owned.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformConfig {
    ClaudeCode(ClaudeCodeConfig),
    Kiro(KiroConfig),
    Cursor(CursorConfig),
}

/// One platform's payload, borrowed from an `ide` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformConfigRef<'a> {
    ClaudeCode(&'a ClaudeCodeConfig),
    Kiro(&'a KiroConfig),
    Cursor(&'a CursorConfig),
}

impl PlatformConfig {
    pub fn platform(&self) -> Platform {
        match self {
            Self::ClaudeCode(_) => Platform::ClaudeCode,
            Self::Kiro(_) => Platform::Kiro,
            Self::Cursor(_) => Platform::Cursor,
        }
    }

    pub fn as_config_ref(&self) -> PlatformConfigRef<'_> {
        match self {
            Self::ClaudeCode(c) => PlatformConfigRef::ClaudeCode(c),
            Self::Kiro(c) => PlatformConfigRef::Kiro(c),
            Self::Cursor(c) => PlatformConfigRef::Cursor(c),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_config_ref().is_empty()
    }
}

impl PlatformConfigRef<'_> {
    pub fn platform(&self) -> Platform {
        match self {
            Self::ClaudeCode(_) => Platform::ClaudeCode,
            Self::Kiro(_) => Platform::Kiro,
            Self::Cursor(_) => Platform::Cursor,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::ClaudeCode(c) => c.is_empty(),
            Self::Kiro(c) => c.is_empty(),
            Self::Cursor(c) => c.is_empty(),
        }
    }
}
