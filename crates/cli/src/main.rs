//! Command-line interface for the `taptik` application.
//!
//! Builds a context from a Kiro, Claude Code or Cursor project, converts it
//! between platforms and deploys the result.

mod app;
mod cli;
mod commands;
mod config;

fn main() -> std::process::ExitCode {
    app::run()
}
