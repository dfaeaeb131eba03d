//! Configuration file support for taptik.
//!
//! Loads settings from `~/.taptik/config.toml` with the following precedence:
//! CLI arguments > Environment variables > Config file > built-in defaults
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.taptik/config.toml
//!
//! [deploy]
//! # How deployment treats files that already exist: replace | merge | skip
//! merge_policy = "merge"
//!
//! [convert]
//! # Compatibility score below which `taptik compat` flags a conversion
//! min_score = 60
//!
//! [limits]
//! max_rule_bytes = 1024
//! max_context_bytes = 10240
//! max_prompt_bytes = 512
//! max_total_bytes = 1048576
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use taptik_validate::SizeLimits;

/// Environment variable holding the deployment merge policy.
pub const MERGE_POLICY_ENV: &str = "TAPTIK_MERGE_POLICY";

/// Top-level configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub convert: ConvertConfig,
    /// Content size limits; unset keys keep their defaults.
    #[serde(default)]
    pub limits: SizeLimits,
}

/// Configuration for the deploy command.
#[derive(Debug, Default, Deserialize)]
pub struct DeployConfig {
    /// `replace`, `merge` or `skip`.
    pub merge_policy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertConfig {
    pub min_score: Option<u32>,
}

impl Config {
    /// Compatibility threshold shown by `compat`.
    pub fn min_score(&self) -> u32 {
        self.convert
            .min_score
            .unwrap_or(taptik_sync::converters::compatibility::COMPATIBILITY_THRESHOLD)
    }
}

/// Returns the path to the config file (~/.taptik/config.toml).
fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".taptik").join("config.toml"))
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but fails to parse.
pub fn load_config() -> Result<Option<Config>> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(None),
    }
}

pub fn load_config_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))?;
    Ok(Some(config))
}

/// Applies configuration file settings to environment variables.
///
/// Only sets environment variables that are not already set, preserving
/// the precedence: CLI > ENV > config file. Call before parsing arguments.
pub fn apply_config_to_env(config: &Config) {
    if let Some(policy) = &config.deploy.merge_policy {
        set_if_absent(MERGE_POLICY_ENV, policy);
    }
}

fn set_if_absent(key: &str, value: &str) {
    if std::env::var(key).is_err() {
        std::env::set_var(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taptik_test_utils::{env_guard, set_env_var};

    #[test]
    fn config_path_returns_expected_location() {
        let path = config_path().unwrap();
        assert!(path.ends_with(".taptik/config.toml"));
    }

    #[test]
    fn parse_minimal_config() {
        let config: Config = toml::from_str("[deploy]\n").unwrap();
        assert!(config.deploy.merge_policy.is_none());
        assert_eq!(config.limits, SizeLimits::default());
        assert_eq!(config.min_score(), 60);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [deploy]
            merge_policy = "skip"

            [convert]
            min_score = 75

            [limits]
            max_rule_bytes = 2048
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.deploy.merge_policy.as_deref(), Some("skip"));
        assert_eq!(config.min_score(), 75);
        assert_eq!(config.limits.max_rule_bytes, 2048);
        assert_eq!(
            config.limits.max_context_bytes,
            SizeLimits::default().max_context_bytes
        );
    }

    #[test]
    fn load_missing_file_returns_none() {
        let tmp = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&tmp.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_invalid_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[deploy\nmerge_policy = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid TOML"));
    }

    #[test]
    fn apply_config_respects_existing_env_vars() {
        let _g = env_guard();
        let _var = set_env_var(MERGE_POLICY_ENV, Some("replace"));
        let config = Config {
            deploy: DeployConfig {
                merge_policy: Some("skip".to_string()),
            },
            ..Default::default()
        };

        apply_config_to_env(&config);

        assert_eq!(std::env::var(MERGE_POLICY_ENV).unwrap(), "replace");
    }

    #[test]
    fn apply_config_fills_unset_env_vars() {
        let _g = env_guard();
        let _var = set_env_var(MERGE_POLICY_ENV, None);
        let config = Config {
            deploy: DeployConfig {
                merge_policy: Some("skip".to_string()),
            },
            ..Default::default()
        };

        apply_config_to_env(&config);

        assert_eq!(std::env::var(MERGE_POLICY_ENV).unwrap(), "skip");
    }
}
