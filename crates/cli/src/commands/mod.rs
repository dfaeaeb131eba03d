//! CLI command handlers for the taptik application.

mod build;
mod convert;
mod deploy;
mod detect;
mod scan;

pub(crate) use build::handle_build_command;
pub(crate) use convert::{handle_compat_command, handle_convert_command, handle_pairs_command};
pub(crate) use deploy::{handle_deploy_command, DeployArgs};
pub(crate) use detect::handle_detect_command;
pub(crate) use scan::handle_scan_command;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use taptik_core::{Platform, TaptikContext};
use tracing::debug;

/// Loads a context file, rejecting unsupported versions.
pub(crate) fn read_context(path: &Path) -> Result<TaptikContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read context file {}", path.display()))?;
    let context = TaptikContext::from_json(&content)?;
    debug!(path = %path.display(), name = %context.metadata.name, "Loaded context");
    Ok(context)
}

/// Writes `context` as pretty JSON to `output`, or stdout.
pub(crate) fn write_context(context: &TaptikContext, output: Option<&PathBuf>) -> Result<()> {
    let json = context.to_json_pretty()?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// The platform a context should be converted from.
///
/// An explicit `--from` wins; otherwise the first platform listed in the
/// context metadata that actually carries configuration.
pub(crate) fn resolve_source(
    context: &TaptikContext,
    explicit: Option<Platform>,
    path: &Path,
) -> Result<Platform> {
    if let Some(platform) = explicit {
        return Ok(platform);
    }
    match context
        .metadata
        .platforms
        .iter()
        .copied()
        .find(|p| context.has_source_configuration(*p))
    {
        Some(platform) => Ok(platform),
        None => bail!(
            "{} does not name a source platform with configuration; pass --from",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taptik_core::{KiroConfig, PlatformConfig, SteeringRule};

    fn kiro_context() -> TaptikContext {
        TaptikContext::builder("demo")
            .platform_config(PlatformConfig::Kiro(KiroConfig {
                steering_rules: Some(vec![SteeringRule {
                    name: "tech".into(),
                    content: "Rust".into(),
                    ..Default::default()
                }]),
                ..Default::default()
            }))
            .build()
    }

    #[test]
    fn resolve_source_prefers_explicit_platform() {
        let source = resolve_source(&kiro_context(), Some(Platform::Cursor), Path::new("c.json"));
        assert_eq!(source.unwrap(), Platform::Cursor);
    }

    #[test]
    fn resolve_source_uses_metadata() {
        let source = resolve_source(&kiro_context(), None, Path::new("c.json"));
        assert_eq!(source.unwrap(), Platform::Kiro);
    }

    #[test]
    fn resolve_source_fails_for_empty_context() {
        let empty = TaptikContext::builder("demo").build();
        let err = resolve_source(&empty, None, Path::new("c.json")).unwrap_err();
        assert!(err.to_string().contains("--from"));
    }

    #[test]
    fn context_file_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/ctx.json");
        write_context(&kiro_context(), Some(&path)).unwrap();
        let loaded = read_context(&path).unwrap();
        assert!(loaded.has_source_configuration(Platform::Kiro));
    }
}
