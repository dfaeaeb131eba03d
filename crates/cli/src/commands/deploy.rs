use super::{read_context, resolve_source};
use anyhow::Result;
use std::path::Path;
use taptik_core::{FileSystem, Platform, TaptikError};
use taptik_sync::{MergePolicy, StrategyRegistry};

pub(crate) struct DeployArgs<'a> {
    pub to: Platform,
    pub from: Option<Platform>,
    pub context: &'a Path,
    pub target: &'a Path,
    pub policy: MergePolicy,
}

/// Handle the `deploy` command.
pub(crate) fn handle_deploy_command(
    fs: &dyn FileSystem,
    registry: &StrategyRegistry,
    args: DeployArgs<'_>,
) -> Result<()> {
    let context = read_context(args.context)?;
    let source = resolve_source(&context, args.from, args.context)?;
    let result = registry.deploy(&context, source, args.to, args.target, args.policy, fs);

    print!("{}", result.format_summary());
    for guidance in result.skipped_files.iter().filter_map(|s| s.guidance()) {
        println!("  hint: {guidance}");
    }
    if result.success {
        return Ok(());
    }
    let error = result
        .errors
        .into_iter()
        .next()
        .unwrap_or_else(|| TaptikError::Serialization("deployment failed".to_string()));
    Err(error.into())
}
