//! Transaction analyzer.
//!
//! This program loads a user's exported transaction log and prints one of the
//! analysis reports to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --user asha month
//! cargo run -- --file transactions_asha.txt top --limit 10
//! cargo run -- --user asha --csv category > categories.csv
//! ```
//!
//! # Input Format
//!
//! One transaction per line, seven pipe-separated fields:
//! `id|kind|date|amount|category|details|timestamp`, where `kind` is one of
//! `deposit`, `withdrawal`, `transfer` or `received`.
//!
//! # Output
//!
//! Reports print as plain text. With `--csv` the rows of each report are
//! written as CSV with a header line instead; a month's leading transactions
//! are left out of the CSV rows.
//!
//! # Logging
//!
//! Log output goes to stderr at `info` by default; set `RUST_LOG` to change it.
use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use serde::Serialize;

use khazana_analyzer::engine;
use khazana_analyzer::io;
use khazana_analyzer::render;
use khazana_analyzer::types::{Report, Transaction};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Exported transaction log to analyze
    #[arg(long, conflicts_with = "user")]
    file: Option<String>,

    /// Read `transactions_<USER>.txt` from the current directory
    #[arg(long)]
    user: Option<String>,

    /// Write report rows as CSV instead of text
    #[arg(long, global = true)]
    csv: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Income, expense and net per month
    Month,
    /// Expense totals per category
    Category,
    /// Largest expenses first
    Top {
        /// How many expenses to show
        #[arg(
            long,
            default_value_t = engine::DEFAULT_TOP_LIMIT,
            allow_negative_numbers = true
        )]
        limit: i64,
    },
    /// Overall income, expense and savings rate
    Stats,
    /// Every report in turn
    All,
}

/// Prints a report as text, or its rows as CSV when `csv` is set.
///
/// A [`Report::NoData`] in CSV mode writes nothing to stdout and logs the
/// informational message instead.
fn print_report<T, R>(
    report: &Report<T>,
    csv: bool,
    rows: impl FnOnce(&T) -> &[R],
    text: impl FnOnce(&Report<T>) -> String,
) -> Result<()>
where
    R: Serialize,
{
    match (csv, report) {
        (false, _) => print!("{}", text(report)),
        (true, Report::NoData) => warn!("{}", render::NO_DATA_MESSAGE),
        (true, Report::Ready(value)) => io::write_rows_as_csv_to_stdout(rows(value))?,
    }
    Ok(())
}

/// Runs one report command over the loaded transactions.
///
/// # Errors
///
/// Returns an error if the engine rejects a record or writing the output fails.
fn run(command: Command, transactions: &[Transaction], csv: bool) -> Result<()> {
    match command {
        Command::Month => print_report(
            &engine::analyze_by_month(transactions)?,
            csv,
            Vec::as_slice,
            render::render_months,
        ),
        Command::Category => print_report(
            &engine::analyze_by_category(transactions)?,
            csv,
            Vec::as_slice,
            render::render_categories,
        ),
        Command::Top { limit } => print_report(
            &engine::top_expenses(transactions, limit)?,
            csv,
            Vec::as_slice,
            |report| render::render_top_expenses(report, limit),
        ),
        Command::Stats => print_report(
            &engine::statistics(transactions)?,
            csv,
            std::slice::from_ref,
            render::render_statistics,
        ),
        Command::All => {
            let sections = [
                Command::Month,
                Command::Category,
                Command::Top {
                    limit: engine::DEFAULT_TOP_LIMIT,
                },
                Command::Stats,
            ];
            for (i, section) in sections.into_iter().enumerate() {
                if i > 0 {
                    println!();
                }
                run(section, transactions, csv)?;
            }
            Ok(())
        }
    }
}

/// Main entry point for the transaction analyzer.
///
/// # Errors
///
/// Returns an error if neither `--file` nor `--user` is given, the log cannot
/// be opened, a report rejects a record, or writing the output fails.
fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let path = match (cli.file, cli.user) {
        (Some(file), _) => file,
        (None, Some(user)) => io::user_file_name(&user),
        (None, None) => anyhow::bail!("Missing input: pass --file or --user"),
    };

    let loaded = io::load_transactions(&path)?;
    run(cli.command, &loaded.transactions, cli.csv)?;
    info!("Report finished for {}", path);

    Ok(())
}
