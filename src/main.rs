//! GRC Client - Command line entry point
//!
//! Runs the tree view and inline edit engines against local JSON files.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use grc_client::domain::config::load_app_config;
use grc_client::services::block_on;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_app_config(cli.config.as_deref())?;
    let _log_guard = cli::logging::init_logging(&config.log, cli.log_level.as_deref())?;

    tracing::debug!("Starting grc-client with view {}", config.tree.view_key());

    block_on(async move {
        match cli.command {
            Command::Tree(args) => cli::commands::run_tree(&config, args).await,
            Command::Edit(args) => cli::commands::run_edit(&config, args).await,
        }
    })?
}
