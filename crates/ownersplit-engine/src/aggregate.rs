//! Expense category and income aggregation.

use ownersplit_core::{CarLedger, ExpenseCategory, Month, MonthlyLedgerEntry};
use rust_decimal::Decimal;
use serde::Serialize;

/// Total of an expense category for a month.
///
/// Sums the category's fixed line items for `month` plus the `month` value of
/// every dynamic subcategory in the category. Missing rows, fields and values
/// count as zero; this never fails.
#[must_use]
pub fn category_total(ledger: &CarLedger, category: ExpenseCategory, month: Month) -> Decimal {
    let fixed: Decimal = ledger
        .category_row(category, month)
        .map_or(Decimal::ZERO, |row| {
            category
                .fixed_fields()
                .iter()
                .map(|field| row.field(field))
                .sum()
        });

    let dynamic: Decimal = ledger
        .dynamic_subcategories(category)
        .iter()
        .map(|sub| sub.value_for(month))
        .sum();

    fixed + dynamic
}

/// All three category totals for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    /// Direct delivery total.
    pub direct_delivery: Decimal,
    /// Cost of goods sold total.
    pub cogs: Decimal,
    /// Parking fee and labor total.
    pub parking_fee_labor: Decimal,
}

impl CategoryTotals {
    /// Aggregate every category for `month`.
    #[must_use]
    pub fn for_month(ledger: &CarLedger, month: Month) -> Self {
        Self {
            direct_delivery: category_total(ledger, ExpenseCategory::DirectDelivery, month),
            cogs: category_total(ledger, ExpenseCategory::Cogs, month),
            parking_fee_labor: category_total(ledger, ExpenseCategory::ParkingFeeLabor, month),
        }
    }

    /// The total for one category.
    #[must_use]
    pub const fn get(&self, category: ExpenseCategory) -> Decimal {
        match category {
            ExpenseCategory::DirectDelivery => self.direct_delivery,
            ExpenseCategory::Cogs => self.cogs,
            ExpenseCategory::ParkingFeeLabor => self.parking_fee_labor,
        }
    }
}

/// Income recorded inside `rental_income` that isn't rent.
///
/// Delivery, prepaid electric and gas, smoking fines, miles, ski racks,
/// child seats, coolers, insurance payouts and other income.
#[must_use]
pub fn pass_through_income(entry: &MonthlyLedgerEntry) -> Decimal {
    entry.delivery_income
        + entry.electric_prepaid_income
        + entry.gas_prepaid_income
        + entry.smoking_fines
        + entry.miles_income
        + entry.ski_racks_income
        + entry.child_seat_income
        + entry.coolers_income
        + entry.insurance_wreck_income
        + entry.other_income
}

/// Rental income net of every pass-through item.
#[must_use]
pub fn net_rental_income(entry: &MonthlyLedgerEntry) -> Decimal {
    entry.rental_income - pass_through_income(entry)
}
