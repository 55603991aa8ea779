//! epilog CLI
//!
//! Command-line tools for inspecting diary stores.
//!
//! # Commands
//!
//! - `inspect` - Display store statistics and record counts
//! - `verify` - Check log integrity (sequencing, parents, hash chain)
//! - `days` - Show the day status for a date range
//! - `dump-log` - Dump raw events for debugging

mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// epilog command-line diary store tools.
#[derive(Parser)]
#[command(name = "epilog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display store statistics and record counts
    Inspect {
        /// List individual active records
        #[arg(short, long)]
        records: bool,
    },

    /// Check log integrity
    Verify,

    /// Show the day status for a date range
    Days {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Dump raw events for debugging
    DumpLog {
        /// Maximum number of events to dump
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = cli.path.ok_or("store path required (--path)")?;

    match cli.command {
        Commands::Inspect { records } => commands::inspect::run(&path, records)?,
        Commands::Verify => commands::verify::run(&path)?,
        Commands::Days { from, to } => commands::days::run(&path, from, to)?,
        Commands::DumpLog { limit } => commands::dump_log::run(&path, limit)?,
    }

    Ok(())
}
