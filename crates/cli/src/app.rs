//! Startup: configuration layering, logging and command dispatch.

use crate::cli::{Cli, Commands};
use crate::commands::{
    self, handle_build_command, handle_compat_command, handle_convert_command,
    handle_detect_command, handle_pairs_command, handle_scan_command,
};
use crate::config::{self, Config};
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use taptik_core::{LocalFileSystem, TaptikError};
use taptik_sync::StrategyRegistry;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// The main entry point for the `taptik` application.
pub fn run() -> ExitCode {
    // The config file feeds environment defaults that clap reads during parsing.
    let (config, config_error) = match config::load_config() {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(err) => (Config::default(), Some(err)),
    };
    config::apply_config_to_env(&config);

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Some(err) = config_error {
        tracing::warn!("Ignoring configuration file: {err:#}");
    }
    debug!(limits = ?config.limits, min_score = config.min_score(), "Effective configuration");

    match dispatch(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(command: Commands, config: &Config) -> Result<()> {
    let fs = LocalFileSystem::new();
    let registry = StrategyRegistry::with_defaults();
    match command {
        Commands::Detect { path, json } => handle_detect_command(&fs, &path, json),
        Commands::Build {
            platform,
            path,
            output,
        } => handle_build_command(&fs, config.limits, platform, &path, output.as_ref()),
        Commands::Convert {
            to,
            from,
            context,
            output,
        } => handle_convert_command(&registry, to, from, &context, output.as_ref()),
        Commands::Compat {
            to,
            from,
            context,
            json,
        } => handle_compat_command(&registry, to, from, &context, config.min_score(), json),
        Commands::Deploy {
            to,
            from,
            context,
            target,
            merge_policy,
        } => commands::handle_deploy_command(
            &fs,
            &registry,
            commands::DeployArgs {
                to,
                from,
                context: &context,
                target: &target,
                policy: merge_policy,
            },
        ),
        Commands::Scan { file, json } => handle_scan_command(&file, json),
        Commands::Pairs => handle_pairs_command(&registry),
    }
}

/// `error [CODE]: message` plus a hint line, or the anyhow chain for other errors.
fn render_error(err: &anyhow::Error) -> String {
    let Some(taptik) = err.downcast_ref::<TaptikError>() else {
        return format!("error: {err:#}\n");
    };
    let mut out = format!("error [{}]: {taptik}\n", taptik.code());
    if let TaptikError::ValidationFailed { errors, .. } = taptik {
        for error in errors {
            out.push_str(&format!("  - {} [{}] {}\n", error.field, error.code, error.message));
        }
    }
    if let Some(hint) = taptik.suggestion() {
        out.push_str(&format!("hint: {hint}\n"));
    }
    out
}
