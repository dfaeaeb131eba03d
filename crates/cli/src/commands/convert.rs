use super::{read_context, resolve_source, write_context};
use anyhow::Result;
use std::path::{Path, PathBuf};
use taptik_core::Platform;
use taptik_sync::StrategyRegistry;
use tracing::info;

/// Handle the `convert` command.
pub(crate) fn handle_convert_command(
    registry: &StrategyRegistry,
    to: Platform,
    from: Option<Platform>,
    context_path: &Path,
    output: Option<&PathBuf>,
) -> Result<()> {
    let context = read_context(context_path)?;
    let source = resolve_source(&context, from, context_path)?;
    let outcome = registry.convert(&context, source, to);

    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    for approx in &outcome.approximations {
        eprintln!(
            "approximated: {} -> {} ({} confidence) {}",
            approx.feature,
            approx.target,
            approx.confidence.as_str(),
            approx.notes
        );
    }
    if !outcome.unsupported_features.is_empty() {
        eprintln!("dropped: {}", outcome.unsupported_features.join(", "));
    }

    let converted = outcome.into_result()?;
    info!(from = %source, to = %to, "Converted context");
    write_context(&converted, output)
}

/// Handle the `compat` command.
pub(crate) fn handle_compat_command(
    registry: &StrategyRegistry,
    to: Platform,
    from: Option<Platform>,
    context_path: &Path,
    min_score: u32,
    json: bool,
) -> Result<()> {
    let context = read_context(context_path)?;
    let source = resolve_source(&context, from, context_path)?;
    let report = registry.validate_compatibility(&context, source, to)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{source} -> {to}: {}", report.format_summary());
    if !report.supported_features.is_empty() {
        println!("  direct:      {}", report.supported_features.join(", "));
    }
    for partial in &report.partial_support {
        println!(
            "  approximate: {} ({}%) {}",
            partial.feature, partial.support_level, partial.notes
        );
    }
    if !report.unsupported_features.is_empty() {
        println!("  unsupported: {}", report.unsupported_features.join(", "));
    }
    if report.score < min_score {
        println!("  below the configured minimum score of {min_score}");
    }
    Ok(())
}

/// Handle the `pairs` command.
pub(crate) fn handle_pairs_command(registry: &StrategyRegistry) -> Result<()> {
    for key in registry.pairs() {
        println!("{key}");
    }
    for source in Platform::ALL {
        for target in Platform::ALL {
            if source == target || registry.get(source, target).is_some() {
                continue;
            }
            if let Some(chain) = registry.find_chain(source, target) {
                let via: Vec<String> = chain
                    .iter()
                    .take(chain.len().saturating_sub(1))
                    .map(|s| s.target().to_string())
                    .collect();
                println!("{source} -> {target} (via {})", via.join(" -> "));
            }
        }
    }
    Ok(())
}
