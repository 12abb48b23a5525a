//! Owner split formulas.
//!
//! The payable for a month is `owner_terms + shared_terms`, floored at zero:
//!
//! - `shared_terms` is the owner's percentage of the shared pool (net rental
//!   income, and in mode 50 also the carry-over and the direct delivery and
//!   COGS expenses).
//! - `owner_terms` is what the owner receives or bears outright (miles, 10% of
//!   smoking fines, ski racks depending on who owns them, and in mode 70 the
//!   carry-over and every category expense).
//!
//! All branches live in [`compute`] so each formula can be audited in one
//! place.

use ownersplit_core::{CarLedger, Month, MonthlyLedgerEntry, SplitMode, YearRegime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{net_rental_income, CategoryTotals};
use crate::carry_over::{carry_over, carry_over_schedule, SMOKING_FINE_SHARE};

/// How ski-rack income enters the current-regime formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkiRacksBranch {
    /// No ski-rack income this month.
    NoIncome,
    /// Racks owned by the operator: the owner gets no direct ski-rack term.
    OperatorOwned,
    /// Racks owned by someone else: the owner keeps the whole ski-rack income.
    OtherOwned,
}

impl SkiRacksBranch {
    fn select(ledger: &CarLedger, entry: &MonthlyLedgerEntry, month: Month) -> Self {
        if entry.ski_racks_income.is_zero() {
            Self::NoIncome
        } else if ledger.formula_setting.ski_racks_owner(month).is_gla() {
            Self::OperatorOwned
        } else {
            Self::OtherOwned
        }
    }
}

/// Every intermediate value behind a month's payable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitBreakdown {
    /// Ledger year.
    pub year: i32,
    /// Month computed.
    pub month: Month,
    /// Formula family for the year.
    pub regime: YearRegime,
    /// Split mode configured for the month.
    pub mode: SplitMode,
    /// Ski-rack branch; only the current regime distinguishes ski-rack owners.
    pub ski_racks: Option<SkiRacksBranch>,
    /// Owner share as a fraction.
    pub owner_percent: Decimal,
    /// Carry-over into the month (zero or negative).
    pub carry_over: Decimal,
    /// Category totals for the month.
    pub totals: CategoryTotals,
    /// Terms credited or charged to the owner outright.
    pub owner_terms: Decimal,
    /// The owner's percentage share of the pooled terms.
    pub shared_terms: Decimal,
    /// `owner_terms + shared_terms` before the zero floor.
    pub unfloored: Decimal,
    /// The amount owed to the owner.
    pub payable: Decimal,
}

/// The amount owed to the car's owner for `month`.
///
/// Zero for years before 2019; never negative.
#[must_use]
pub fn owner_split(ledger: &CarLedger, month: Month) -> Decimal {
    split_breakdown(ledger, month).payable
}

/// The payable for `month` along with every term used to compute it.
#[must_use]
pub fn split_breakdown(ledger: &CarLedger, month: Month) -> SplitBreakdown {
    let regime = YearRegime::for_year(ledger.year);
    let carry = if regime == YearRegime::NoCalculation {
        Decimal::ZERO
    } else {
        carry_over(ledger, month)
    };
    compute(ledger, month, carry)
}

/// Carry-over and payable for one month of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    /// The month.
    pub month: Month,
    /// Split mode configured for the month.
    pub mode: SplitMode,
    /// Carry-over into the month.
    pub carry_over: Decimal,
    /// Amount owed to the owner.
    pub payable: Decimal,
}

/// Carry-over and payable for all twelve months of the ledger's year.
#[must_use]
pub fn annual_schedule(ledger: &CarLedger) -> Vec<MonthSummary> {
    let regime = YearRegime::for_year(ledger.year);
    let carries = if regime == YearRegime::NoCalculation {
        [Decimal::ZERO; 12]
    } else {
        carry_over_schedule(ledger)
    };

    Month::all()
        .map(|month| {
            let breakdown = compute(ledger, month, carries[month.index()]);
            MonthSummary {
                month,
                mode: breakdown.mode,
                carry_over: breakdown.carry_over,
                payable: breakdown.payable,
            }
        })
        .collect()
}

fn compute(ledger: &CarLedger, month: Month, carry: Decimal) -> SplitBreakdown {
    let regime = YearRegime::for_year(ledger.year);
    let mode = ledger.formula_setting.mode(month);
    let entry = ledger.entry_or_empty(month);
    let pct = entry.owner_percent();
    let totals = CategoryTotals::for_month(ledger, month);
    let net = net_rental_income(&entry);
    let fines = entry.smoking_fines * SMOKING_FINE_SHARE;
    let ski = entry.ski_racks_income;

    let (ski_racks, owner_terms, shared_terms) = match (regime, mode) {
        (YearRegime::NoCalculation, _) => (None, Decimal::ZERO, Decimal::ZERO),

        (YearRegime::Current, SplitMode::Mode50) => {
            let branch = SkiRacksBranch::select(ledger, &entry, month);
            let base = entry.miles_income + fines;
            let owner = match branch {
                SkiRacksBranch::NoIncome | SkiRacksBranch::OperatorOwned => base,
                SkiRacksBranch::OtherOwned => base + ski,
            };
            let shared = (net + carry - totals.direct_delivery - totals.cogs) * pct;
            (Some(branch), owner, shared)
        }

        (YearRegime::Current, SplitMode::Mode70) => {
            let branch = SkiRacksBranch::select(ledger, &entry, month);
            let base = entry.miles_income
                - totals.direct_delivery
                - totals.cogs
                - totals.parking_fee_labor
                + carry
                + fines;
            let owner = match branch {
                SkiRacksBranch::NoIncome => ski * pct + base,
                SkiRacksBranch::OperatorOwned => base,
                SkiRacksBranch::OtherOwned => ski + base,
            };
            (Some(branch), owner, net * pct)
        }

        (YearRegime::Legacy, SplitMode::Mode50) => {
            let extras = entry.ski_racks_income
                + entry.child_seat_income
                + entry.coolers_income
                + entry.insurance_wreck_income
                + entry.other_income;
            let owner = entry.miles_income + extras * pct;
            let shared = (net + carry - totals.direct_delivery - totals.cogs) * pct;
            (None, owner, shared)
        }

        (YearRegime::Legacy, SplitMode::Mode70) => {
            let owner = entry.miles_income
                - totals.direct_delivery
                - totals.cogs
                - totals.parking_fee_labor
                + carry
                + fines;
            (None, owner, net * pct)
        }
    };

    let unfloored = owner_terms + shared_terms;
    let payable = unfloored.max(Decimal::ZERO);

    tracing::debug!(
        car = %ledger.car_id,
        year = ledger.year,
        month = month.number(),
        ?regime,
        %mode,
        ?ski_racks,
        %carry,
        %unfloored,
        %payable,
        "owner split"
    );

    SplitBreakdown {
        year: ledger.year,
        month,
        regime,
        mode,
        ski_racks,
        owner_percent: pct,
        carry_over: carry,
        totals,
        owner_terms,
        shared_terms,
        unfloored,
        payable,
    }
}
