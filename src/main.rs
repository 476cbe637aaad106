//! xrefdoc - cross-referenced documentation for Python packages.

mod cli;
mod config;
mod core;
mod diagnostics;
mod logger;
mod package;
mod page;
mod pipeline;
mod resolve;
mod rewrite;
mod source;
mod utils;
mod xref;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { clean } => cli::build::build_site(&config, *clean),
        Commands::Check { strict } => cli::check::check_site(&config, *strict),
        Commands::Locate { ident } => cli::locate::locate_ident(&config, ident),
    }
}
