use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taptik_core::Platform;
use taptik_sync::MergePolicy;

/// Command-line interface for the `taptik` application.
#[derive(Debug, Parser)]
#[command(
    name = "taptik",
    version,
    about = "Converts IDE configuration between Claude Code, Kiro and Cursor"
)]
pub struct Cli {
    /// Enables debug logging (overrides `RUST_LOG`).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available `taptik` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lists the platforms configured under a project root.
    Detect {
        /// Project root.
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Prints JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Builds a context file from a project's configuration.
    Build {
        /// Source platform (detected when omitted).
        #[arg(long, value_name = "PLATFORM")]
        platform: Option<Platform>,
        /// Project root.
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Writes the context here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Converts a context file to another platform.
    Convert {
        /// Target platform.
        #[arg(long, value_name = "PLATFORM")]
        to: Platform,
        /// Source platform (taken from the context when omitted).
        #[arg(long, value_name = "PLATFORM")]
        from: Option<Platform>,
        /// Context file produced by `taptik build`.
        context: PathBuf,
        /// Writes the converted context here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Reports how well a context maps onto another platform.
    Compat {
        #[arg(long, value_name = "PLATFORM")]
        to: Platform,
        #[arg(long, value_name = "PLATFORM")]
        from: Option<Platform>,
        context: PathBuf,
        /// Prints JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Writes a context's files for a platform into a directory.
    Deploy {
        /// Platform whose files are written.
        #[arg(long, value_name = "PLATFORM")]
        to: Platform,
        #[arg(long, value_name = "PLATFORM")]
        from: Option<Platform>,
        context: PathBuf,
        /// Directory to deploy into.
        #[arg(long, value_name = "DIR")]
        target: PathBuf,
        /// What to do with files that already exist: replace, merge or skip.
        #[arg(long, env = "TAPTIK_MERGE_POLICY", default_value_t = MergePolicy::Merge)]
        merge_policy: MergePolicy,
    },
    /// Scans a text or JSON file for secrets, dangerous commands and prompt injection.
    Scan {
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Lists the conversions the registry supports.
    Pairs,
}
