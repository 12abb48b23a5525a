//! Owner revenue split engine.
//!
//! This crate provides:
//! - Expense category aggregation (fixed line items plus dynamic subcategories)
//! - Negative-balance carry-over between months
//! - The owner split formulas for each year regime and split mode
//! - Payable resolution over any [`LedgerAccessor`](ownersplit_core::LedgerAccessor)
//!
//! Every function is a pure computation over a ledger snapshot: no caching,
//! no I/O of its own, no shared state.
//!
//! # Carry-over
//!
//! A month whose net result is negative leaves a deficit that reduces the next
//! month's split. Deficits accumulate until a month absorbs them; a positive
//! result never carries forward.
//!
//! ```ignore
//! use ownersplit_engine::{carry_over, owner_split};
//!
//! // March 2026: payable after absorbing February's deficit
//! let deficit = carry_over(&ledger, march);
//! let payable = owner_split(&ledger, march);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod carry_over;
mod resolve;
mod split;

pub use aggregate::{category_total, net_rental_income, pass_through_income, CategoryTotals};
pub use carry_over::{carry_over, carry_over_schedule};
pub use resolve::{resolve_payable, Payable, PayableResolver, Resolution, ResolveError};
pub use split::{
    annual_schedule, owner_split, split_breakdown, MonthSummary, SkiRacksBranch, SplitBreakdown,
};

use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount for presentation.
///
/// Internal values are never rounded; only what is shown to a user is.
#[must_use]
pub fn round_for_display(amount: Decimal, precision: u32, strategy: RoundingStrategy) -> Decimal {
    amount.round_dp_with_strategy(precision, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_for_display() {
        let away = RoundingStrategy::MidpointAwayFromZero;
        let even = RoundingStrategy::MidpointNearestEven;
        assert_eq!(round_for_display(dec!(10.125), 2, away), dec!(10.13));
        assert_eq!(round_for_display(dec!(10.125), 2, even), dec!(10.12));
        assert_eq!(round_for_display(dec!(-0.005), 2, away), dec!(-0.01));
        assert_eq!(round_for_display(dec!(7), 2, away), dec!(7));
    }
}
