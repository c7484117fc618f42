//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Baler asset bundler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: baler.toml)
    #[arg(short = 'C', long, default_value = "baler.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Bundle the entries and everything they reference
    #[command(visible_alias = "b")]
    Build {
        /// Files or directories to bundle, replacing the configured
        /// entries (relative to the config file's directory)
        #[arg(value_hint = clap::ValueHint::AnyPath)]
        entries: Vec<PathBuf>,

        /// Output directory path
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        out_dir: Option<PathBuf>,

        /// Root that absolute references resolve against
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        base_path: Option<PathBuf>,

        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Shared build arguments
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Skip source maps for compiled stylesheets
    #[arg(long)]
    pub no_source_map: bool,

    /// Emit compressed CSS
    #[arg(short = 'm', long)]
    pub minify_css: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
}
