//! MCP server registry files (`.mcp.json`, `.kiro/settings/mcp.json`, `.cursor/mcp.json`).
//!
//! Reading accepts both the map form `{"mcpServers": {"name": {...}}}` and
//! the list form `{"servers": [{"name": ..., ...}]}`. Writing always uses
//! the map form.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use taptik_core::McpServer;
use tracing::warn;

/// Keys with a typed field on [`McpServer`]; everything else lands in `config`.
const KNOWN_KEYS: &[&str] = &[
    "name", "command", "args", "env", "url", "headers", "enabled", "disabled", "version",
];

/// Parses a registry document. Malformed entries are skipped with a warning.
pub fn parse_registry(doc: &Value, source: &str) -> (Vec<McpServer>, Vec<String>) {
    let mut servers = Vec::new();
    let mut warnings = Vec::new();

    let entries: Vec<(Option<String>, &Value)> = match (doc.get("mcpServers"), doc.get("servers")) {
        (Some(Value::Object(map)), _) | (None, Some(Value::Object(map))) => {
            map.iter().map(|(k, v)| (Some(k.clone()), v)).collect()
        }
        (None, Some(Value::Array(list))) => list.iter().map(|v| (None, v)).collect(),
        (None, None) => Vec::new(),
        _ => {
            warnings.push(format!("{source}: MCP registry has an unexpected shape"));
            Vec::new()
        }
    };

    for (key, entry) in entries {
        match parse_server(key, entry, source, &mut warnings) {
            Some(server) => servers.push(server),
            None => warnings.push(format!("{source}: skipped MCP entry that is not an object")),
        }
    }
    (servers, warnings)
}

fn parse_server(
    key: Option<String>,
    entry: &Value,
    source: &str,
    warnings: &mut Vec<String>,
) -> Option<McpServer> {
    let obj = entry.as_object()?;
    let name = key
        .or_else(|| obj.get("name").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();

    let text = |field: &str| obj.get(field).and_then(Value::as_str).map(str::to_string);

    let args = match obj.get("args") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    warn!(server = %name, index = i, "Skipping non-string value in MCP server args");
                    None
                }
            })
            .collect(),
        Some(other) => {
            warnings.push(format!("{source}: '{name}' args should be an array, got {other}"));
            Vec::new()
        }
        None => Vec::new(),
    };

    let enabled = match (obj.get("enabled"), obj.get("disabled")) {
        (Some(Value::Bool(enabled)), _) => *enabled,
        (_, Some(Value::Bool(disabled))) => !disabled,
        _ => true,
    };

    let config: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Some(McpServer {
        command: text("command"),
        url: text("url"),
        args,
        env: string_map(obj.get("env"), &name, "env", source, warnings),
        headers: string_map(obj.get("headers"), &name, "headers", source, warnings),
        config: (!config.is_empty()).then_some(config),
        enabled,
        version: text("version"),
        name,
    })
}

fn string_map(
    value: Option<&Value>,
    server: &str,
    field: &str,
    source: &str,
    warnings: &mut Vec<String>,
) -> BTreeMap<String, String> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k.clone(), s.clone())),
                Value::Number(_) | Value::Bool(_) => Some((k.clone(), v.to_string())),
                _ => {
                    warn!(server, key = %k, "Skipping non-scalar value in MCP server {field}");
                    None
                }
            })
            .collect(),
        Some(_) => {
            warnings.push(format!("{source}: '{server}' {field} should be an object"));
            BTreeMap::new()
        }
        None => BTreeMap::new(),
    }
}

/// Renders servers in the `{"mcpServers": {...}}` form.
pub fn render_registry(servers: &[McpServer]) -> Value {
    let mut map = Map::new();
    for server in servers {
        let mut entry = Map::new();
        if let Some(command) = &server.command {
            entry.insert("command".into(), json!(command));
        }
        if !server.args.is_empty() {
            entry.insert("args".into(), json!(server.args));
        }
        if !server.env.is_empty() {
            entry.insert("env".into(), json!(server.env));
        }
        if let Some(url) = &server.url {
            entry.insert("url".into(), json!(url));
        }
        if !server.headers.is_empty() {
            entry.insert("headers".into(), json!(server.headers));
        }
        if let Some(version) = &server.version {
            entry.insert("version".into(), json!(version));
        }
        if !server.enabled {
            entry.insert("disabled".into(), json!(true));
        }
        if let Some(config) = &server.config {
            for (k, v) in config {
                entry.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
        map.insert(server.name.clone(), Value::Object(entry));
    }
    json!({ "mcpServers": map })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_form() {
        let doc = json!({
            "mcpServers": {
                "github": {
                    "command": "npx",
                    "args": ["-y", "@modelcontextprotocol/server-github"],
                    "env": {"GITHUB_PERSONAL_ACCESS_TOKEN": "${GITHUB_TOKEN}"},
                    "autoApprove": ["list_issues"]
                },
                "remote": {"url": "https://mcp.example.com/sse", "disabled": true}
            }
        });
        let (servers, warnings) = parse_registry(&doc, ".mcp.json");
        assert!(warnings.is_empty());
        assert_eq!(servers.len(), 2);
        let github = servers.iter().find(|s| s.name == "github").unwrap();
        assert_eq!(github.args.len(), 2);
        assert_eq!(github.config.as_ref().unwrap()["autoApprove"][0], "list_issues");
        let remote = servers.iter().find(|s| s.name == "remote").unwrap();
        assert!(!remote.enabled);
        assert_eq!(remote.url.as_deref(), Some("https://mcp.example.com/sse"));
    }

    #[test]
    fn test_list_form() {
        let doc = json!({"servers": [{"name": "fs", "command": "mcp-fs"}, {"command": "anon"}]});
        let (servers, _) = parse_registry(&doc, "mcp.json");
        assert_eq!(servers[0].name, "fs");
        assert_eq!(servers[1].name, "");
    }

    #[test]
    fn test_wrong_types_are_warnings() {
        let doc = json!({"mcpServers": {"x": {"command": "a", "args": "oops", "env": [1]}}, "y": 1});
        let (servers, warnings) = parse_registry(&doc, "m.json");
        assert_eq!(servers.len(), 1);
        assert!(servers[0].args.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_render_then_parse_preserves_servers() {
        let mut server = McpServer::stdio("db", "mcp-postgres");
        server.args = vec!["--readonly".into()];
        server.enabled = false;
        let doc = render_registry(std::slice::from_ref(&server));
        assert_eq!(doc["mcpServers"]["db"]["disabled"], true);
        let (parsed, _) = parse_registry(&doc, "m.json");
        assert_eq!(parsed, vec![server]);
    }
}
