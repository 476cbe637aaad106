//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Cross-referenced documentation builder for Python packages
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: xrefdoc.toml)
    #[arg(short = 'C', long, global = true, default_value = "xrefdoc.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print informational diagnostics and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the page set, indexes and rewritten links
    #[command(visible_alias = "b")]
    Build {
        /// Remove the output directory before writing
        #[arg(short, long)]
        clean: bool,
    },

    /// Resolve every page and report diagnostics without writing anything
    #[command(visible_alias = "c")]
    Check {
        /// Exit with an error when any warning is recorded
        #[arg(short, long)]
        strict: bool,
    },

    /// Print the declaring file, line and source URL of an identifier
    #[command(visible_alias = "l")]
    Locate {
        /// Dotted identifier, e.g. `pkg.math.MovingAverage`
        ident: String,
    },
}
