//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// No-bundle ES module dev server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve a project directory with live reload
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },
}

/// Arguments of the `serve` command. Options left unset keep the value from
/// `modserve.toml`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Project root to serve
    #[arg(default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub root: PathBuf,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// WebSocket port for reload messages
    #[arg(long)]
    pub hmr_port: Option<u16>,

    /// Value exposed to pages as process.env.NODE_ENV
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Enable file watching for live reload
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub watch: Option<bool>,
}
