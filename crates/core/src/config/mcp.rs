//! MCP server descriptor shared by every platform.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transport used to reach an MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    /// Spawned process speaking over stdin/stdout.
    Stdio,
    /// Remote server reached over HTTP/SSE.
    Http,
}

/// An MCP server configuration.
///
/// Exactly one of `command` (stdio) or `url` (http) is expected; a descriptor
/// with neither is rejected by builder validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct McpServer {
    /// Server name/identifier
    pub name: String,
    /// Command to execute (path to binary)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Remote endpoint for http servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Command arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment variables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// HTTP headers for remote servers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Platform-specific extras (`autoApprove`, `timeout`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
    /// Whether the server is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

fn default_true() -> bool {
    true
}

impl McpServer {
    /// Creates an enabled stdio server.
    pub fn stdio(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: Some(command.into()),
            enabled: true,
            ..Default::default()
        }
    }

    /// Creates an enabled http server.
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
            enabled: true,
            ..Default::default()
        }
    }

    /// Transport implied by the populated fields. `url` wins when a command is absent.
    pub fn transport(&self) -> McpTransport {
        match (&self.command, &self.url) {
            (None, Some(_)) => McpTransport::Http,
            _ => McpTransport::Stdio,
        }
    }

    /// True when neither a non-empty `command` nor a non-empty `url` is present.
    pub fn is_missing_endpoint(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.command) && blank(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_detection() {
        assert_eq!(McpServer::stdio("a", "npx").transport(), McpTransport::Stdio);
        assert_eq!(
            McpServer::http("b", "https://mcp.example.com").transport(),
            McpTransport::Http
        );
    }

    #[test]
    fn test_missing_endpoint() {
        let mut server = McpServer {
            name: "empty".into(),
            ..Default::default()
        };
        assert!(server.is_missing_endpoint());
        server.command = Some("  ".into());
        assert!(server.is_missing_endpoint());
        server.url = Some("http://localhost:9000".into());
        assert!(!server.is_missing_endpoint());
    }

    #[test]
    fn test_enabled_defaults_to_true_when_deserialized() {
        let server: McpServer =
            serde_json::from_str(r#"{"name":"fs","command":"mcp-fs"}"#).unwrap();
        assert!(server.enabled);
        assert!(server.args.is_empty());
    }
}
