//! CLI argument definitions for Stickyboard.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::LogFormat;

/// Version string with build metadata, shown by `--version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("SB_GIT_COMMIT"),
    ", built ",
    env!("SB_BUILD_TIMESTAMP"),
    ")"
);

/// Stickyboard - a real-time shared sticky-note board server.
///
/// Run without a subcommand to start the server with resolved settings.
#[derive(Parser, Debug)]
#[command(name = "stickyboard", author, version)]
#[command(long_version = LONG_VERSION)]
#[command(about = "Real-time shared sticky-note board server")]
#[command(long_about = None)]
pub struct Cli {
    /// Read settings from this config.kdl instead of ~/.config/stickyboard/config.kdl.
    /// The file must exist when given explicitly.
    #[arg(short, long = "config", global = true, env = "STICKYBOARD_CONFIG")]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the board server (default)
    Serve(ServeArgs),

    /// Configuration inspection
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Flags for `serve`. Unset flags fall through to env, config file, then defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Host address to bind to (default: 127.0.0.1, use 0.0.0.0 for network access)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default: 3001, 0 picks a free port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Tracing filter, e.g. "info" or "stickyboard=debug"
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Reject cross-origin requests instead of allowing any origin
    #[arg(long)]
    pub no_cors: bool,
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    s.parse()
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings and where each came from
    Show {
        /// Print the effective settings as config.kdl instead of JSON
        #[arg(long)]
        kdl: bool,
    },

    /// Print the default config file location
    Path,
}
