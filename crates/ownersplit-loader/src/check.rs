//! Data-quality checks over decoded ledgers.
//!
//! These run on a ledger as it was read, before rows with an invalid month
//! are dropped, so every problem in the snapshot is reported once.

use ownersplit_core::lenient::{at_amount_limit, MAX_AMOUNT};
use ownersplit_core::{CarLedger, ExpenseCategory, Month};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fmt;

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The value is ignored or suspicious; the split is still well defined.
    Warning,
    /// The split depends on which of several conflicting rows is read.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A data-quality issue found in a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Issue code (L001-L005).
    pub code: &'static str,
    /// Severity.
    pub severity: Severity,
    /// Car the ledger belongs to.
    pub car_id: String,
    /// Ledger year.
    pub year: i32,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    fn new(
        code: &'static str,
        severity: Severity,
        ledger: &CarLedger,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            car_id: ledger.car_id.clone(),
            year: ledger.year,
            message: message.into(),
        }
    }

    /// Whether this issue is error-level.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{} {}]: {}",
            self.severity, self.code, self.car_id, self.year, self.message
        )
    }
}

/// Check one ledger.
///
/// Codes:
/// - `L001` row with a month outside 1-12 (ignored)
/// - `L002` several rows for the same month (first one is used)
/// - `L003` field that is not part of the category (not summed)
/// - `L004` owner split percent outside 0-100
/// - `L005` amount capped to the largest supported magnitude
#[must_use]
pub fn check_ledger(ledger: &CarLedger) -> Vec<Issue> {
    let mut issues = Vec::new();

    let income_months: Vec<u32> = ledger.income_expenses.iter().map(|e| e.month).collect();
    check_months(ledger, "incomeExpenses", &income_months, &mut issues);

    for entry in &ledger.income_expenses {
        for (name, value) in entry.amounts() {
            if at_amount_limit(value) {
                issues.push(capped(ledger, "incomeExpenses", entry.month, name));
            }
        }

        let percent = entry.car_owner_split_percent;
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            issues.push(Issue::new(
                "L004",
                Severity::Warning,
                ledger,
                format!(
                    "incomeExpenses month {}: carOwnerSplitPercent {percent} is outside 0-100",
                    entry.month
                ),
            ));
        }
    }

    for category in ExpenseCategory::ALL {
        let rows = ledger.category_rows(category);
        let months: Vec<u32> = rows.iter().map(|r| r.month).collect();
        check_months(ledger, category.key(), &months, &mut issues);

        for row in rows {
            for (name, &value) in &row.fields {
                if at_amount_limit(value) {
                    issues.push(capped(ledger, category.key(), row.month, name));
                }
            }
            for name in row.fields.keys() {
                if !category.is_fixed_field(name) {
                    issues.push(Issue::new(
                        "L003",
                        Severity::Warning,
                        ledger,
                        format!(
                            "{} month {}: unknown field \"{name}\" is not summed",
                            category.key(),
                            row.month
                        ),
                    ));
                }
            }
        }

        for sub in ledger.dynamic_subcategories(category) {
            let months: Vec<u32> = sub.values.iter().map(|v| v.month).collect();
            let section = format!("{} subcategory \"{}\"", category.key(), sub.name);
            check_months(ledger, &section, &months, &mut issues);
            for value in sub.values.iter().filter(|v| at_amount_limit(v.value)) {
                issues.push(capped(ledger, &section, value.month, "value"));
            }
        }
    }

    issues
}

fn capped(ledger: &CarLedger, section: &str, month: u32, field: &str) -> Issue {
    Issue::new(
        "L005",
        Severity::Warning,
        ledger,
        format!("{section} month {month}: \"{field}\" is capped at +/-{MAX_AMOUNT}"),
    )
}

fn check_months(ledger: &CarLedger, section: &str, months: &[u32], issues: &mut Vec<Issue>) {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    for &number in months {
        if Month::new(number).is_err() {
            issues.push(Issue::new(
                "L001",
                Severity::Warning,
                ledger,
                format!("{section}: row with invalid month {number} is ignored"),
            ));
        } else if !seen.insert(number) && reported.insert(number) {
            issues.push(Issue::new(
                "L002",
                Severity::Error,
                ledger,
                format!("{section}: several rows for month {number}, the first one is used"),
            ));
        }
    }
}

/// Drop every row whose month is outside 1-12.
///
/// Returns the number of rows removed.
pub fn drop_invalid_rows(ledger: &mut CarLedger) -> usize {
    fn valid(month: u32) -> bool {
        Month::new(month).is_ok()
    }

    let before = row_count(ledger);
    ledger.income_expenses.retain(|e| e.valid_month().is_some());
    ledger.direct_delivery.retain(|r| valid(r.month));
    ledger.cogs.retain(|r| valid(r.month));
    ledger.parking_fee_labor.retain(|r| valid(r.month));
    let dynamic = &mut ledger.dynamic_subcategories;
    for subs in [
        &mut dynamic.direct_delivery,
        &mut dynamic.cogs,
        &mut dynamic.parking_fee_labor,
    ] {
        for sub in subs.iter_mut() {
            sub.values.retain(|v| valid(v.month));
        }
    }
    before - row_count(ledger)
}

fn row_count(ledger: &CarLedger) -> usize {
    let dynamic: usize = ExpenseCategory::ALL
        .iter()
        .flat_map(|&c| ledger.dynamic_subcategories(c))
        .map(|s| s.values.len())
        .sum();
    ledger.income_expenses.len()
        + ledger.direct_delivery.len()
        + ledger.cogs.len()
        + ledger.parking_fee_labor.len()
        + dynamic
}
