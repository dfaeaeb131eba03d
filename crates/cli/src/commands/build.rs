use super::write_context;
use anyhow::Result;
use std::path::{Path, PathBuf};
use taptik_core::{FileSystem, Platform, TaptikError};
use taptik_sync::{Pipeline, PipelineRequest, StrategyRegistry};
use taptik_validate::SizeLimits;

/// Handle the `build` command.
pub(crate) fn handle_build_command(
    fs: &dyn FileSystem,
    limits: SizeLimits,
    platform: Option<Platform>,
    path: &Path,
    output: Option<&PathBuf>,
) -> Result<()> {
    let registry = StrategyRegistry::with_defaults();
    let mut request = PipelineRequest::new(path);
    request.source = platform;
    let report = Pipeline::new(fs, &registry).with_limits(limits).run(&request);

    if let Some(validation) = &report.validation {
        for warning in &validation.warnings {
            eprintln!("warning: {}: {}", warning.field, warning.message);
        }
    }
    if let Some(err) = report.error {
        return Err(err.into());
    }
    let Some(context) = report.context else {
        return Err(TaptikError::NoPlatformDetected {
            path: path.to_path_buf(),
        }
        .into());
    };
    if let Some(source) = report.source {
        eprintln!("Built {} context from {}", source.display_name(), path.display());
    }
    write_context(&context, output)
}
