//! Core types for ownersplit
//!
//! This crate provides the data model shared by the split engine, the loader
//! and the command-line tools:
//!
//! - [`Month`] - A calendar month (1-12)
//! - [`YearRegime`] - Which family of split formulas applies to a year
//! - [`MonthlyLedgerEntry`] - One month of rental income figures for a car
//! - [`ExpenseCategory`] / [`CategoryRow`] - Fixed expense line items
//! - [`DynamicSubcategory`] - User-defined expense line items
//! - [`FormulaSettings`] - Per-month split mode and ski-rack ownership
//! - [`CarLedger`] - Everything recorded for one car in one year
//! - [`LedgerAccessor`] / [`LedgerStore`] - Read-only access to car ledgers
//!
//! # Example
//!
//! ```
//! use ownersplit_core::{CarLedger, Month, MonthlyLedgerEntry, YearRegime};
//! use rust_decimal_macros::dec;
//!
//! let march = Month::new(3).unwrap();
//! let mut entry = MonthlyLedgerEntry::empty(march);
//! entry.rental_income = dec!(1200.00);
//! entry.car_owner_split_percent = dec!(60);
//!
//! let ledger = CarLedger::new("car-17", 2026).with_entry(entry);
//!
//! assert_eq!(ledger.entry_or_empty(march).owner_percent(), dec!(0.6));
//! assert_eq!(YearRegime::for_year(ledger.year), YearRegime::Current);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod formula;
pub mod ledger;
pub mod lenient;
pub mod month;
pub mod store;

pub use formula::{FormulaSettings, SkiRacksOwner, SplitMode, YearRegime};
pub use ledger::{
    CarLedger, CategoryRow, DynamicSubcategories, DynamicSubcategory, DynamicValue,
    ExpenseCategory, MonthlyLedgerEntry,
};
pub use month::{Month, MonthError};
pub use store::{LedgerAccessor, LedgerKey, LedgerStore};

// Re-export commonly used external types
pub use rust_decimal::Decimal;
