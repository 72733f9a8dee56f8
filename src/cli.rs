use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// zdd - zero-downtime deployments for PostgreSQL schema changes
#[derive(Parser, Debug)]
#[command(name = "zdd")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Deployments live in the deployments directory as \
    '{id}_{name}' subdirectories with per-phase SQL files and shell hooks.")]
pub struct Cli {
    /// PostgreSQL connection string
    #[arg(short = 'd', long, global = true)]
    pub database_url: Option<String>,

    /// Path to the deployments directory
    #[arg(short = 'p', long, global = true)]
    pub deployments_path: Option<PathBuf>,

    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new deployment from templates
    #[command(alias = "new")]
    Create {
        /// Deployment name (lowercased; spaces become underscores)
        name: String,
    },

    /// Show applied, pending, and missing deployments
    #[command(alias = "list")]
    Status,

    /// Apply all pending deployments in order
    Deploy,
}
