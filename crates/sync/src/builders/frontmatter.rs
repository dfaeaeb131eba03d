//! YAML frontmatter for steering documents and `.mdc` rule files.

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

/// Splits `content` into its frontmatter YAML (if any) and body.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let trimmed = content.trim_start();
    let Some(after_open) = trimmed.strip_prefix("---") else {
        return (None, content);
    };
    let after_open = after_open.trim_start_matches(['\r', '\n']);

    // Empty frontmatter: the closing fence follows the opening one directly.
    if let Some(rest) = after_open.strip_prefix("---") {
        return (Some(""), rest.trim_start_matches(['\r', '\n']));
    }

    for fence in ["\n---", "\r\n---"] {
        if let Some(end) = after_open.find(fence) {
            let yaml = &after_open[..end];
            let rest = after_open[end + fence.len()..].trim_start_matches(['\r', '\n']);
            return (Some(yaml), rest);
        }
    }
    (None, content)
}

/// Parses frontmatter into `T`, falling back to `T::default()` on malformed YAML.
///
/// `path` is only used for the warning.
pub fn parse_frontmatter<T>(content: &str, path: &str) -> (T, String)
where
    T: DeserializeOwned + Default,
{
    let (yaml, body) = split_frontmatter(content);
    let meta = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => match serde_yaml::from_str::<T>(yaml) {
            Ok(meta) => meta,
            Err(err) => {
                warn!(path, error = %err, "Ignoring invalid YAML frontmatter");
                T::default()
            }
        },
        _ => T::default(),
    };
    (meta, body.to_string())
}

/// Renders `meta` as a frontmatter block followed by `body`.
pub fn render_frontmatter<T: Serialize>(meta: &T, body: &str) -> String {
    let yaml = serde_yaml::to_string(meta).unwrap_or_default();
    let yaml = yaml.trim_end();
    if yaml.is_empty() || yaml == "{}" {
        return body.to_string();
    }
    format!("---\n{yaml}\n---\n\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Meta {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inclusion: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_match_pattern: Option<String>,
    }

    #[test]
    fn test_split_without_frontmatter() {
        assert_eq!(split_frontmatter("# Title\nbody"), (None, "# Title\nbody"));
    }

    #[test]
    fn test_split_with_frontmatter() {
        let (yaml, body) = split_frontmatter("---\ninclusion: manual\n---\n\n# Body\n");
        assert_eq!(yaml, Some("inclusion: manual"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_unclosed_frontmatter_is_body() {
        let content = "---\ninclusion: manual\n# never closed";
        assert_eq!(split_frontmatter(content), (None, content));
    }

    #[test]
    fn test_invalid_yaml_falls_back_to_default() {
        let (meta, body) = parse_frontmatter::<Meta>("---\ninclusion: [oops\n---\nbody", "x.md");
        assert_eq!(meta, Meta::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_render_then_parse() {
        let meta = Meta {
            inclusion: Some("fileMatch".into()),
            file_match_pattern: Some("src/**/*.rs".into()),
        };
        let rendered = render_frontmatter(&meta, "Use clippy.\n");
        assert!(rendered.starts_with("---\n"));
        let (parsed, body) = parse_frontmatter::<Meta>(&rendered, "x.md");
        assert_eq!(parsed, meta);
        assert_eq!(body, "Use clippy.\n");
    }

    #[test]
    fn test_render_empty_meta_is_plain_body() {
        assert_eq!(render_frontmatter(&Meta::default(), "plain"), "plain");
    }
}
