//! Command-line parsing for the AGI income estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io::ingest::ColumnSpec;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "agi",
    version,
    about = "Mean and median household income per zip code from IRS AGI bracket counts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate mean and median income for one or more zip codes.
    Query(QueryArgs),
    /// Launch the interactive TUI.
    ///
    /// The TUI loads the table once and lets you query zip codes repeatedly.
    Tui(TuiArgs),
}

/// Options shared by every command that reads the data table.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// IRS zip-code AGI CSV (falls back to `AGI_DATA_PATH`, then `./Data/20zpallagi.csv`).
    #[arg(short = 'd', long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Column holding the zip code.
    #[arg(long, default_value = "zipcode")]
    pub zone_column: String,

    /// Column holding the AGI bracket index (1-6).
    #[arg(long, default_value = "agi_stub")]
    pub bracket_column: String,

    /// Column holding the number of returns.
    #[arg(long, default_value = "N1")]
    pub count_column: String,
}

impl DataArgs {
    pub fn column_spec(&self) -> ColumnSpec {
        ColumnSpec::new(&self.zone_column, &self.bracket_column, &self.count_column)
    }
}

/// Options for `agi query`.
#[derive(Debug, Parser, Clone)]
pub struct QueryArgs {
    /// Zip code(s) to estimate.
    #[arg(required = true, value_name = "ZIPCODE")]
    pub zones: Vec<String>,

    #[command(flatten)]
    pub data: DataArgs,

    /// Print the per-bracket return counts under each result.
    #[arg(short = 'b', long)]
    pub breakdown: bool,

    /// Print results as JSON.
    #[arg(long, conflicts_with = "breakdown")]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// No log output.
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Options for `agi tui`.
#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Write debug logs to this file (the terminal is owned by the UI).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
