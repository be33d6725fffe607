//! Command-line interface definitions.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand};

/// Live typst editing pipeline
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (optional, defaults apply when missing)
    #[arg(short = 'C', long, global = true, default_value = "editor.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the highlight spans of a typst file
    #[command(visible_alias = "t")]
    Tokens {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Compile a file through a headless editor and write the preview SVG
    #[command(visible_alias = "p")]
    Preview {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Output path (stdout if omitted)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Serve editors to the host page over WebSocket
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Tokens { common, .. }
            | Commands::Preview { common, .. }
            | Commands::Serve { common, .. } => common.verbose,
        }
    }
}
