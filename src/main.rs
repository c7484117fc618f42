//! Baler - an asset bundler for static sites. Follows references out
//! of templates and bundles everything they reach.

#![allow(dead_code)]

mod bundle;
mod cli;
mod config;
mod eval;
mod logger;
mod scan;
mod transform;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use cli::{Cli, Commands};
use config::BundleConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = BundleConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::run_build(config),
    }
}
