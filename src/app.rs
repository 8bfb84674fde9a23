//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - resolves and loads the data table (once)
//! - runs zone queries and prints results

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};

use crate::cli::{Command, DataArgs, QueryArgs, TuiArgs};
use crate::error::{AppError, EXIT_INPUT};
use crate::io::ingest::ReturnTable;

pub mod pipeline;

/// Environment variable consulted when `--data` is not given.
pub const DATA_PATH_ENV: &str = "AGI_DATA_PATH";
/// Path used when neither `--data` nor `AGI_DATA_PATH` is set.
pub const DEFAULT_DATA_PATH: &str = "./Data/20zpallagi.csv";

/// Entry point for the `agi` binary.
pub fn run() -> Result<(), AppError> {
    // We want `agi` to open the TUI and `agi 98115` to behave like
    // `agi query 98115`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Query(args) => handle_query(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_query(args: QueryArgs) -> Result<(), AppError> {
    init_term_logging(log_level(args.verbose, args.quiet));

    let table = load_table(&args.data)?;
    info!(
        "{}",
        crate::report::format_load_summary(table.stats(), table.row_errors())
    );

    let results = pipeline::run_batch(&args.zones, &table);
    let multi = args.zones.len() > 1;

    if args.json {
        println!("{}", crate::report::format_json(&args.zones, &results)?);
    } else {
        for result in &results {
            match result {
                Ok(report) => {
                    println!("{}", crate::report::format_zone_line(report));
                    if args.breakdown {
                        println!("{}", crate::report::format_breakdown(report));
                    }
                }
                // A single failure is reported once, by `main`.
                Err(err) if multi => eprintln!("{err}"),
                Err(_) => {}
            }
        }
    }

    let failed: Vec<_> = results.into_iter().filter_map(Result::err).collect();
    match failed.first() {
        None => Ok(()),
        Some(first) if !multi && !args.json => Err(first.clone().into()),
        Some(first) => Err(AppError::new(
            first.exit_code(),
            format!("{} of {} zone queries failed.", failed.len(), args.zones.len()),
        )),
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    if let Some(path) = &args.log_file {
        init_file_logging(path)?;
    }
    let table = load_table(&args.data)?;
    crate::tui::run(table)
}

/// Resolve the data path and load the table.
pub fn load_table(args: &DataArgs) -> Result<ReturnTable, AppError> {
    let path = resolve_data_path(args.data.clone());
    ReturnTable::load(&path, &args.column_spec())
}

/// `--data` flag, else `AGI_DATA_PATH` (a `.env` file is honoured), else the default.
pub fn resolve_data_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    dotenvy::dotenv().ok();
    data_path_or_default(std::env::var(DATA_PATH_ENV).ok())
}

fn data_path_or_default(env_value: Option<String>) -> PathBuf {
    env_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Off;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn log_config() -> simplelog::Config {
    ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build()
}

fn init_term_logging(level: LevelFilter) {
    // A logger may already be installed (e.g. in tests); keep the first one.
    let _ = TermLogger::init(level, log_config(), TerminalMode::Stderr, ColorChoice::Auto);
}

fn init_file_logging(path: &Path) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create log file '{}': {e}", path.display()),
        )
    })?;
    let _ = WriteLogger::init(LevelFilter::Debug, log_config(), file);
    Ok(())
}

/// Rewrite argv so bare `agi` opens the TUI and `agi <ZIP>` runs a query.
///
/// Rules:
/// - `agi`                      -> `agi tui`
/// - `agi 98115 ...`            -> `agi query 98115 ...`
/// - `agi -v 98115 ...`         -> `agi query -v 98115 ...`
/// - `agi -d f.csv ...`         -> `agi tui -d f.csv ...`
/// - `agi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "query" | "tui");
    if is_subcommand {
        return argv;
    }

    // Leading flags belong to `tui` unless a zip code follows them.
    if arg1.starts_with('-') && !has_positional(&argv[1..]) {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise it is a zip code.
    argv.insert(1, "query".to_string());
    argv
}

/// Flags whose value is the following token.
const VALUE_FLAGS: &[&str] = &[
    "-d",
    "--data",
    "--zone-column",
    "--bracket-column",
    "--count-column",
    "--log-file",
];

/// True when `args` holds a bare token that is not a flag value.
fn has_positional(args: &[String]) -> bool {
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        if token == "--" {
            return tokens.next().is_some();
        }
        if VALUE_FLAGS.contains(&token.as_str()) {
            tokens.next();
            continue;
        }
        if !token.starts_with('-') {
            return true;
        }
    }
    false
}
