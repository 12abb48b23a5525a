//! Payable resolution: "what is the owner of car C owed for year Y, month M".

use ownersplit_core::{CarLedger, LedgerAccessor, Month, YearRegime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

use crate::round_for_display;
use crate::split::{split_breakdown, SplitBreakdown};

/// Errors that can occur while resolving a payable.
///
/// A missing ledger is not an error; see [`Payable::LedgerNotFound`].
#[derive(Debug, Error)]
pub enum ResolveError<E>
where
    E: std::error::Error + 'static,
{
    /// The ledger accessor failed.
    #[error("failed to fetch ledger for car {car_id}, year {year}")]
    Access {
        /// The car requested.
        car_id: String,
        /// The year requested.
        year: i32,
        /// The accessor's error.
        #[source]
        source: E,
    },
}

/// Outcome of a payable lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum Payable {
    /// The amount owed (zero or positive).
    Due(Decimal),
    /// No ledger exists for the requested car and year.
    LedgerNotFound,
}

impl Payable {
    /// The amount owed; zero when the ledger is missing.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        match self {
            Self::Due(amount) => *amount,
            Self::LedgerNotFound => Decimal::ZERO,
        }
    }

    /// Whether a ledger was found.
    #[must_use]
    pub const fn is_ledger_found(&self) -> bool {
        matches!(self, Self::Due(_))
    }

    /// The amount rounded for presentation.
    #[must_use]
    pub fn display_amount(&self, precision: u32, strategy: RoundingStrategy) -> Decimal {
        round_for_display(self.amount(), precision, strategy)
    }
}

/// A resolved payable with the context it was computed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The car requested.
    pub car_id: String,
    /// The year requested.
    pub year: i32,
    /// The month requested.
    pub month: Month,
    /// The payable.
    pub payable: Payable,
    /// The computation, when a split was computed from a ledger.
    pub breakdown: Option<SplitBreakdown>,
    /// For January: whether the prior year's ledger exists. Its December is
    /// not carried into January, so this only flags that history was ignored.
    /// `None` for other months or when the lookup failed.
    pub prior_year_ledger_found: Option<bool>,
}

/// Resolves payables against a ledger source.
#[derive(Debug, Clone, Copy)]
pub struct PayableResolver<'a, A> {
    accessor: &'a A,
}

impl<'a, A: LedgerAccessor> PayableResolver<'a, A> {
    /// Create a resolver over `accessor`.
    #[must_use]
    pub const fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    /// Resolve the payable for a car, year and month.
    ///
    /// Years before 2019 resolve to zero without consulting the accessor.
    pub fn resolve(
        &self,
        car_id: &str,
        year: i32,
        month: Month,
    ) -> Result<Resolution, ResolveError<A::Error>> {
        let mut resolution = Resolution {
            car_id: car_id.to_string(),
            year,
            month,
            payable: Payable::Due(Decimal::ZERO),
            breakdown: None,
            prior_year_ledger_found: None,
        };

        if YearRegime::for_year(year) == YearRegime::NoCalculation {
            tracing::debug!(
                car = car_id,
                year,
                "no split computed before {}",
                YearRegime::FIRST_LEGACY_YEAR
            );
            return Ok(resolution);
        }

        let Some(ledger) = self.fetch(car_id, year)? else {
            tracing::warn!(car = car_id, year, "ledger not found");
            resolution.payable = Payable::LedgerNotFound;
            return Ok(resolution);
        };

        // Informational only; a failed lookup leaves the flag unset.
        if month.is_january() {
            match self.fetch(car_id, year - 1) {
                Ok(prior) => {
                    let found = prior.is_some();
                    tracing::debug!(
                        car = car_id,
                        year = year - 1,
                        found,
                        "prior-year ledger checked for january"
                    );
                    resolution.prior_year_ledger_found = Some(found);
                }
                Err(e) => {
                    tracing::warn!(car = car_id, year = year - 1, error = %e, "prior-year lookup failed");
                }
            }
        }

        let breakdown = split_breakdown(&ledger, month);
        resolution.payable = Payable::Due(breakdown.payable);
        resolution.breakdown = Some(breakdown);
        Ok(resolution)
    }

    /// Resolve just the payable amount.
    pub fn resolve_payable(
        &self,
        car_id: &str,
        year: i32,
        month: Month,
    ) -> Result<Payable, ResolveError<A::Error>> {
        self.resolve(car_id, year, month).map(|r| r.payable)
    }

    fn fetch(
        &self,
        car_id: &str,
        year: i32,
    ) -> Result<Option<Cow<'a, CarLedger>>, ResolveError<A::Error>> {
        let accessor: &'a A = self.accessor;
        accessor
            .ledger(car_id, year)
            .map_err(|source| ResolveError::Access {
                car_id: car_id.to_string(),
                year,
                source,
            })
    }
}

/// Resolve the payable for a car, year and month.
///
/// Convenience wrapper around [`PayableResolver::resolve_payable`].
pub fn resolve_payable<A: LedgerAccessor>(
    accessor: &A,
    car_id: &str,
    year: i32,
    month: Month,
) -> Result<Payable, ResolveError<A::Error>> {
    PayableResolver::new(accessor).resolve_payable(car_id, year, month)
}
