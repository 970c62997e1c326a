//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    active::ActiveCommands,
    completions::CompletionsArgs,
    export::ExportArgs,
    import::ImportArgs,
    init::InitArgs,
    query::QueryCommands,
    sync::SyncArgs,
};

#[derive(Parser)]
#[command(name = "dpt")]
#[command(author, version, about = "Despensa Toolkit")]
#[command(
    long_about = "A Unix-style toolkit for running ad-hoc queries over the record collections of a small food-retail business: stock, suppliers, sales, purchases, orders and cash movements."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .dpt/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new DPT workspace
    Init(InitArgs),

    /// Fetch record collections from the backend into the local mirror
    Sync(SyncArgs),

    /// Seed a collection in the local mirror from a JSON file
    Import(ImportArgs),

    /// Run an ad-hoc query over one record category
    #[command(subcommand)]
    Query(QueryCommands),

    /// Inspect or clear the stored active query
    #[command(subcommand)]
    Active(ActiveCommands),

    /// Export the stored active query as an artifact
    Export(ExportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Styled console table
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}
