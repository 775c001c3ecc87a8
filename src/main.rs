//! modserve - a no-bundle dev server for native ES modules.

mod cli;
mod config;
mod core;
mod embed;
mod hmr;
mod html;
mod logger;
mod resolve;
mod rewrite;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Serve { args } => {
            let config = ProjectConfig::load(args)?;
            cli::serve::serve(&config)
        }
    }
}
