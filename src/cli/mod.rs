//! CLI argument definitions

pub mod commands;
pub mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "grc-client",
    version,
    about = "Browse a paged GRC tree and edit record fields inline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to config.toml in the platform config directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level directive, overriding the configured one (e.g. `debug`)
    #[arg(long = "log-level", value_name = "DIRECTIVE", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render one page of a JSON collection as a tree
    Tree(TreeArgs),

    /// Change one field of a JSON record and save it
    Edit(EditArgs),
}

#[derive(Args)]
pub struct TreeArgs {
    /// JSON file holding the collection items
    #[arg(value_name = "COLLECTION")]
    pub collection: PathBuf,

    /// Only show items whose title contains this term
    #[arg(long)]
    pub search: Option<String>,

    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Expand a node and remember it
    #[arg(long, value_name = "ID")]
    pub expand: Vec<String>,

    /// Collapse a node and remember it
    #[arg(long, value_name = "ID")]
    pub collapse: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// JSON file holding the record
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Field name from the `[fields]` configuration
    #[arg(long)]
    pub field: String,

    /// New value (`true`/`false` for checkboxes, `Person:<id>` for people, empty to clear)
    #[arg(long, allow_hyphen_values = true)]
    pub value: String,
}
