//! osplit-payable - Print what a car's owner is owed for one month.
//!
//! # Usage
//!
//! ```bash
//! osplit-payable snapshots/ --car 100 --year 2026 --month 3
//! osplit-payable snapshots/ --car 100 --year 2026 --month 3 --explain
//! osplit-payable fleet.json --car 100 --year 2026 --month 3 --format json
//! ```
//!
//! A missing ledger is reported as a warning and prints an amount of zero;
//! the exit code is still 0.

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, ValueEnum};
use ownersplit_core::Month;
use ownersplit_engine::{Payable, PayableResolver, Resolution, SplitBreakdown};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use super::{init_tracing, load_snapshots, print_load_warnings};
use crate::format::AmountFormat;

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for scripts
    Json,
}

/// Compute the amount owed to a car's owner for one month.
#[derive(Parser, Debug)]
#[command(name = "osplit-payable")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Snapshot file or directory
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Car identifier
    #[arg(short, long)]
    pub car: String,

    /// Ledger year (defaults to the current year)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Month, 1-12 (defaults to the current month)
    #[arg(short, long)]
    pub month: Option<Month>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Show every term used to compute the payable
    #[arg(short, long)]
    pub explain: bool,

    /// Decimal places shown (overrides `display_precision`)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=8))]
    pub precision: Option<u32>,

    /// Descend into subdirectories of PATH
    #[arg(short, long)]
    pub recursive: bool,

    /// Show debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// JSON output for a payable.
#[derive(Debug, Serialize)]
pub struct JsonPayable<'a> {
    /// Car identifier
    pub car_id: &'a str,
    /// Ledger year
    pub year: i32,
    /// Month number
    pub month: Month,
    /// "due" or "ledger_not_found"
    pub status: &'static str,
    /// Amount owed, rounded for display
    pub amount: String,
    /// Currency code
    pub currency: &'a str,
    /// For January: whether the prior year's ledger exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_year_ledger_found: Option<bool>,
    /// Every term behind the amount (with `--explain`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<&'a SplitBreakdown>,
}

/// Main entry point for the payable command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut stdout = io::stdout().lock();

    let today = chrono::Local::now().date_naive();
    let year = args.year.unwrap_or_else(|| today.year());
    let month = match args.month {
        Some(month) => month,
        None => Month::new(today.month())?,
    };

    let loaded = load_snapshots(&args.path, args.recursive)?;
    print_load_warnings(&loaded);

    let resolution = PayableResolver::new(&loaded.store)
        .resolve(&args.car, year, month)
        .with_context(|| format!("failed to resolve payable for car {}", args.car))?;

    if resolution.payable == Payable::LedgerNotFound {
        eprintln!(
            "warning: ledger not found for car {}, year {year}; payable is 0",
            args.car
        );
    }

    let fmt = AmountFormat::from_options(&loaded.options, args.precision);
    let currency = loaded.options.currency.as_str();

    match args.format {
        OutputFormat::Text => {
            print_text(&resolution, args.explain, fmt, currency, &mut stdout)?;
        }
        OutputFormat::Json => {
            let output = JsonPayable {
                car_id: &resolution.car_id,
                year: resolution.year,
                month: resolution.month,
                status: match resolution.payable {
                    Payable::Due(_) => "due",
                    Payable::LedgerNotFound => "ledger_not_found",
                },
                amount: fmt.format(resolution.payable.amount()),
                currency,
                prior_year_ledger_found: resolution.prior_year_ledger_found,
                breakdown: resolution.breakdown.as_ref().filter(|_| args.explain),
            };
            writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
        }
    }

    Ok(())
}

fn print_text<W: Write>(
    resolution: &Resolution,
    explain: bool,
    fmt: AmountFormat,
    currency: &str,
    writer: &mut W,
) -> Result<()> {
    writeln!(
        writer,
        "Car {}, {} {}: {} {}",
        resolution.car_id,
        resolution.month.name(),
        resolution.year,
        fmt.format(resolution.payable.amount()),
        currency
    )?;

    if !explain {
        return Ok(());
    }

    let Some(b) = &resolution.breakdown else {
        return Ok(());
    };

    writeln!(writer)?;
    writeln!(writer, "  {:<20} {}", "Regime", b.regime)?;
    writeln!(writer, "  {:<20} {}", "Split mode", b.mode)?;
    if let Some(branch) = b.ski_racks {
        let label = match branch {
            ownersplit_engine::SkiRacksBranch::NoIncome => "no income",
            ownersplit_engine::SkiRacksBranch::OperatorOwned => "operator owned",
            ownersplit_engine::SkiRacksBranch::OtherOwned => "other owner",
        };
        writeln!(writer, "  {:<20} {label}", "Ski racks")?;
    }
    writeln!(writer, "  {:<20} {}", "Owner share", b.owner_percent)?;
    let rows = [
        ("Carry-over", b.carry_over),
        ("Direct delivery", b.totals.direct_delivery),
        ("COGS", b.totals.cogs),
        ("Parking fee/labor", b.totals.parking_fee_labor),
        ("Owner terms", b.owner_terms),
        ("Shared terms", b.shared_terms),
        ("Before floor", b.unfloored),
        ("Payable", b.payable),
    ];
    for (label, amount) in rows {
        writeln!(writer, "  {label:<20} {:>14}", fmt.format(amount))?;
    }

    if let Some(found) = resolution.prior_year_ledger_found {
        let state = if found { "found" } else { "not found" };
        writeln!(
            writer,
            "  {:<20} {state} (December is not carried into January)",
            "Prior-year ledger"
        )?;
    }

    Ok(())
}
