//! Platform and context-category identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An IDE / AI-assistant platform whose configuration taptik can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// Claude Code (`CLAUDE.md`, `.claude/`, `.mcp.json`)
    ClaudeCode,
    /// Kiro (`.kiro/steering`, `.kiro/specs`, `.kiro/hooks`)
    Kiro,
    /// Cursor (`.cursor/rules`, `.cursorrules`, `.vscode/`)
    Cursor,
}

impl Platform {
    /// Every known platform, in a stable order.
    pub const ALL: [Platform; 3] = [Platform::ClaudeCode, Platform::Kiro, Platform::Cursor];

    /// Wire identifier (`claude-code`, `kiro`, `cursor`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude-code",
            Self::Kiro => "kiro",
            Self::Cursor => "cursor",
        }
    }

    /// Key under which this platform's payload lives in the `ide` section.
    pub fn ide_key(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude_code",
            Self::Kiro => "kiro",
            Self::Cursor => "cursor",
        }
    }

    /// Human-readable product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "Claude Code",
            Self::Kiro => "Kiro",
            Self::Cursor => "Cursor",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a platform name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}' (expected one of: claude-code, kiro, cursor)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "claude" | "claude-code" | "claudecode" => Ok(Self::ClaudeCode),
            "kiro" => Ok(Self::Kiro),
            "cursor" => Ok(Self::Cursor),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// Category of a canonical context section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextCategory {
    Ide,
    Project,
    Prompts,
    Tools,
    Personal,
}

impl ContextCategory {
    pub const ALL: [ContextCategory; 5] = [
        ContextCategory::Ide,
        ContextCategory::Project,
        ContextCategory::Prompts,
        ContextCategory::Tools,
        ContextCategory::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ide => "ide",
            Self::Project => "project",
            Self::Prompts => "prompts",
            Self::Tools => "tools",
            Self::Personal => "personal",
        }
    }
}

impl fmt::Display for ContextCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
