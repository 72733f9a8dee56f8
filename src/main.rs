//! zdd CLI - zero-downtime deployments for PostgreSQL schema changes
//!
//! Usage: zdd <COMMAND>
//!
//! Commands:
//!   create  Create a new deployment from templates
//!   status  Show applied, pending, and missing deployments
//!   deploy  Apply all pending deployments in order

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir()?;
    let (config, warnings) = zdd::config::load_or_default(&working_dir);
    let config = config.with_flags(cli.database_url, cli.deployments_path);

    if !cli.json {
        commands::print_config_warnings(&warnings);
    }

    match cli.command {
        Commands::Create { name } => commands::create::run(&config, &name, cli.json),
        Commands::Status => commands::status::run(&config, cli.json),
        Commands::Deploy => commands::deploy::run(&config, cli.verbose),
    }
}
