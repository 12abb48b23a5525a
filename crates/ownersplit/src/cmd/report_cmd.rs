//! osplit-report - Generate reports from ledger snapshots.
//!
//! # Usage
//!
//! ```bash
//! osplit-report snapshots/ schedule --car 100 --year 2026
//! osplit-report snapshots/ categories --car 100 --year 2026
//! osplit-report snapshots/ check
//! osplit-report snapshots/ cars
//! ```
//!
//! # Reports
//!
//! - `schedule` - Carry-over and payable for every month of a year
//! - `categories` - Expense category totals for every month of a year
//! - `check` - Data-quality issues in the snapshots
//! - `cars` - List loaded snapshots

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ownersplit_core::{CarLedger, Month, YearRegime};
use ownersplit_engine::{annual_schedule, CategoryTotals};
use ownersplit_loader::{LoadResult, Severity};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use super::{init_tracing, load_snapshots, print_load_warnings};
use crate::format::AmountFormat;

/// Generate reports from ledger snapshots.
#[derive(Parser, Debug)]
#[command(name = "osplit-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Snapshot file or directory
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// The report to generate
    #[command(subcommand)]
    report: Report,

    /// Decimal places shown (overrides `display_precision`)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(0..=8))]
    precision: Option<u32>,

    /// Descend into subdirectories of PATH
    #[arg(short, long, global = true)]
    recursive: bool,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Report {
    /// Carry-over and payable for every month of a year
    Schedule {
        /// Car identifier
        #[arg(short, long)]
        car: String,
        /// Ledger year
        #[arg(short, long)]
        year: i32,
    },
    /// Expense category totals for every month of a year
    Categories {
        /// Car identifier
        #[arg(short, long)]
        car: String,
        /// Ledger year
        #[arg(short, long)]
        year: i32,
    },
    /// Report data-quality issues in the snapshots
    Check,
    /// List loaded snapshots
    Cars,
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();

    let loaded = load_snapshots(&args.path, args.recursive)?;
    let fmt = AmountFormat::from_options(&loaded.options, args.precision);

    // `check` lists these itself
    if !matches!(args.report, Report::Check) {
        print_load_warnings(&loaded);
    }

    match &args.report {
        Report::Schedule { car, year } => {
            let ledger = find_ledger(&loaded, car, *year)?;
            report_schedule(ledger, fmt, &mut stdout)?;
        }
        Report::Categories { car, year } => {
            let ledger = find_ledger(&loaded, car, *year)?;
            report_categories(ledger, fmt, &mut stdout)?;
        }
        Report::Check => {
            let errors = report_check(&loaded, &mut stdout)?;
            if errors > 0 {
                return Ok(ExitCode::from(1));
            }
        }
        Report::Cars => {
            report_cars(&loaded, &mut stdout)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn find_ledger<'a>(loaded: &'a LoadResult, car: &str, year: i32) -> Result<&'a CarLedger> {
    loaded
        .store
        .get(car, year)
        .with_context(|| format!("ledger not found for car {car}, year {year}"))
}

fn title<W: Write>(text: &str, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{text}")?;
    writeln!(writer, "{}", "=".repeat(text.len()))?;
    writeln!(writer)
}

/// Print the carry-over and payable for each month.
fn report_schedule<W: Write>(ledger: &CarLedger, fmt: AmountFormat, writer: &mut W) -> Result<()> {
    let regime = YearRegime::for_year(ledger.year);
    title(
        &format!(
            "Schedule for car {}, {}, regime {regime}",
            ledger.car_id, ledger.year
        ),
        writer,
    )?;

    writeln!(
        writer,
        "{:<10} {:>4} {:>14} {:>14}",
        "Month", "Mode", "Carry-over", "Payable"
    )?;
    writeln!(writer, "{}", "-".repeat(45))?;

    let mut total = Decimal::ZERO;
    for row in annual_schedule(ledger) {
        total += row.payable;
        writeln!(
            writer,
            "{:<10} {:>4} {:>14} {:>14}",
            row.month.name(),
            row.mode.to_string(),
            fmt.format(row.carry_over),
            fmt.format(row.payable)
        )?;
    }

    writeln!(writer, "{}", "-".repeat(45))?;
    writeln!(writer, "{:<30} {:>14}", "Total", fmt.format(total))?;
    Ok(())
}

/// Print the category totals for each month.
fn report_categories<W: Write>(
    ledger: &CarLedger,
    fmt: AmountFormat,
    writer: &mut W,
) -> Result<()> {
    title(
        &format!("Expenses for car {}, {}", ledger.car_id, ledger.year),
        writer,
    )?;

    writeln!(
        writer,
        "{:<10} {:>14} {:>14} {:>14} {:>14}",
        "Month", "Delivery", "COGS", "Parking/labor", "Total"
    )?;
    writeln!(writer, "{}", "-".repeat(70))?;

    let mut sum = CategoryTotals::default();
    for month in Month::all() {
        let totals = CategoryTotals::for_month(ledger, month);
        sum.direct_delivery += totals.direct_delivery;
        sum.cogs += totals.cogs;
        sum.parking_fee_labor += totals.parking_fee_labor;
        write_totals_row(month.name(), &totals, fmt, writer)?;
    }

    writeln!(writer, "{}", "-".repeat(70))?;
    write_totals_row("Total", &sum, fmt, writer)?;
    Ok(())
}

fn write_totals_row<W: Write>(
    label: &str,
    totals: &CategoryTotals,
    fmt: AmountFormat,
    writer: &mut W,
) -> io::Result<()> {
    let all = totals.direct_delivery + totals.cogs + totals.parking_fee_labor;
    writeln!(
        writer,
        "{label:<10} {:>14} {:>14} {:>14} {:>14}",
        fmt.format(totals.direct_delivery),
        fmt.format(totals.cogs),
        fmt.format(totals.parking_fee_labor),
        fmt.format(all)
    )
}

/// Print load errors, option warnings and data-quality issues.
///
/// Returns the number of error-level findings.
fn report_check<W: Write>(loaded: &LoadResult, writer: &mut W) -> Result<usize> {
    let mut errors = 0;
    let mut warnings = 0;

    for error in &loaded.errors {
        errors += 1;
        writeln!(writer, "error: {error}")?;
    }

    for warning in &loaded.options.warnings {
        warnings += 1;
        writeln!(writer, "warning: {warning}")?;
    }

    for issue in &loaded.issues {
        match issue.severity {
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
        }
        writeln!(writer, "{issue}")?;
    }

    if errors + warnings > 0 {
        writeln!(writer)?;
    }
    writeln!(
        writer,
        "{} snapshot(s) checked: {errors} error(s), {warnings} warning(s)",
        loaded.store.len()
    )?;
    Ok(errors)
}

/// List every loaded snapshot.
fn report_cars<W: Write>(loaded: &LoadResult, writer: &mut W) -> Result<()> {
    title("Snapshots", writer)?;

    writeln!(
        writer,
        "{:<12} {:>6} {:<18} {:>6}  {}",
        "Car", "Year", "Regime", "Months", "File"
    )?;
    writeln!(writer, "{}", "-".repeat(64))?;

    for ledger in loaded.store.iter() {
        let key = (ledger.car_id.clone(), ledger.year);
        let file = loaded
            .origins
            .get(&key)
            .and_then(|p| p.file_name())
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(
            writer,
            "{:<12} {:>6} {:<18} {:>6}  {file}",
            ledger.car_id,
            ledger.year,
            YearRegime::for_year(ledger.year).to_string(),
            ledger.income_expenses.len(),
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "Total: {} snapshot(s)", loaded.store.len())?;
    Ok(())
}
