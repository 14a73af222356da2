//! CLI argument definitions

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "iac-tagger")]
#[command(
    about = "Stamp infrastructure-as-code resources with identity, content fingerprint and revision",
    long_about = None
)]
#[command(version)]
#[command(group(ArgGroup::new("input").required(true).args(["files", "directory"])))]
pub struct Cli {
    /// Files to process
    #[arg(short, long, num_args = 1.., value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Directory to scan for supported files
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Descend into subdirectories (with --directory)
    #[arg(short, long)]
    pub recursive: bool,

    /// Report every file and marker, and enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would be tagged without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Use this revision id instead of asking git
    #[arg(long, value_name = "ID")]
    pub revision: Option<String>,

    /// Path to a configuration file (default: nearest .iac-tagger.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
