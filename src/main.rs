//! tola-edit - live typst editing pipeline.

#![allow(dead_code)]

mod actor;
mod cli;
mod compiler;
mod config;
mod core;
mod document;
mod host;
mod logger;
mod sync;
mod syntax;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::EditorConfig;

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
    logger::set_verbose(cli.verbose());

    let config = Arc::new(EditorConfig::load(&cli)?);

    match &cli.command {
        Commands::Tokens { file, json, .. } => cli::tokens::print_tokens(file, *json),
        Commands::Preview { file, output, .. } => {
            cli::preview::render_preview(file, output.as_deref(), &config)
        }
        Commands::Serve { .. } => cli::serve::serve(config),
    }
}
