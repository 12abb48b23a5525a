//! Negative-balance carry-over between months.
//!
//! The carry-over into month `m` is the (non-positive) result of month `m-1`,
//! which itself includes the carry-over into `m-1`, so deficits accumulate
//! until a month absorbs them.
//!
//! Two rules differ from what one might expect:
//!
//! - The mode configured for month `m` decides how month `m-1`'s result is
//!   computed, not `m-1`'s own mode.
//! - January starts from zero. Prior-year December is not consulted, even
//!   though the deficit logically continues across the year boundary.
//!
//! Both functions walk forward from January with an explicit accumulator;
//! nothing is cached between calls.

use ownersplit_core::{CarLedger, Month, SplitMode, YearRegime};
use rust_decimal::Decimal;

use crate::aggregate::{net_rental_income, CategoryTotals};

/// Smoking fines credited to the owner at 10%.
pub(crate) const SMOKING_FINE_SHARE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// The carry-over into `month` of the ledger's year.
///
/// Always zero or negative. Zero for every month of 2019 and for January.
#[must_use]
pub fn carry_over(ledger: &CarLedger, month: Month) -> Decimal {
    if ledger.year == YearRegime::FIRST_LEGACY_YEAR {
        return Decimal::ZERO;
    }
    if month.is_january() {
        tracing::debug!(
            car = %ledger.car_id,
            year = ledger.year,
            "january carry-over is zeroed; prior-year december not consulted"
        );
    }

    let mut carried = Decimal::ZERO;
    for current in month.through().skip(1) {
        carried = step(ledger, current, carried);
    }
    carried
}

/// The carry-over into every month of the ledger's year, January first.
///
/// Equivalent to calling [`carry_over`] for each month, in one pass.
#[must_use]
pub fn carry_over_schedule(ledger: &CarLedger) -> [Decimal; 12] {
    let mut schedule = [Decimal::ZERO; 12];
    if ledger.year == YearRegime::FIRST_LEGACY_YEAR {
        return schedule;
    }

    let mut carried = Decimal::ZERO;
    for current in Month::all().skip(1) {
        carried = step(ledger, current, carried);
        schedule[current.index()] = carried;
    }
    schedule
}

/// Carry-over into `current`, given the carry-over into the month before it.
fn step(ledger: &CarLedger, current: Month, previous_carry: Decimal) -> Decimal {
    let Some(previous) = current.previous() else {
        return Decimal::ZERO;
    };
    let mode = ledger.formula_setting.mode(current);
    let entry = ledger.entry_or_empty(previous);
    let totals = CategoryTotals::for_month(ledger, previous);

    let raw = match mode {
        SplitMode::Mode70 => {
            (entry.miles_income + entry.smoking_fines * SMOKING_FINE_SHARE)
                - totals.direct_delivery
                - totals.cogs
                - totals.parking_fee_labor
                + previous_carry
                + net_rental_income(&entry) * entry.owner_percent()
        }
        SplitMode::Mode50 => {
            net_rental_income(&entry) - totals.direct_delivery - totals.cogs + previous_carry
        }
    };

    let carried = raw.min(Decimal::ZERO);
    tracing::trace!(
        car = %ledger.car_id,
        year = ledger.year,
        month = current.number(),
        %mode,
        %raw,
        %carried,
        "carry-over step"
    );
    carried
}
