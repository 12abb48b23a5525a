//! Car ledger types.
//!
//! A [`CarLedger`] is the read-only snapshot of everything recorded for one
//! car in one year: monthly income figures, the three expense categories with
//! their fixed line items, user-defined subcategories, and the formula
//! settings. The split engine never mutates a ledger.

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::formula::FormulaSettings;
use crate::lenient::{self, LenientDecimal, LenientMonth, INVALID_MONTH};
use crate::month::Month;

/// One month of income figures for a car.
///
/// All amounts are unrounded currency values. Missing or non-numeric values
/// in a snapshot decode to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLedgerEntry {
    /// Raw month number from the snapshot (1-12 when valid).
    #[serde(default, deserialize_with = "lenient::month_number")]
    pub month: u32,
    /// Gross rental income, including all pass-through charges below.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub rental_income: Decimal,
    /// Delivery charges.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub delivery_income: Decimal,
    /// Prepaid EV charging.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub electric_prepaid_income: Decimal,
    /// Smoking fines collected from guests.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub smoking_fines: Decimal,
    /// Prepaid fuel.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub gas_prepaid_income: Decimal,
    /// Ski rack rentals.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub ski_racks_income: Decimal,
    /// Extra-mileage charges.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub miles_income: Decimal,
    /// Child seat rentals.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub child_seat_income: Decimal,
    /// Cooler rentals.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub coolers_income: Decimal,
    /// Insurance payouts for wrecks.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub insurance_wreck_income: Decimal,
    /// Anything else.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub other_income: Decimal,
    /// The owner's share, as a percentage (0-100).
    #[serde(
        default,
        alias = "carOwnerSplit",
        deserialize_with = "lenient::decimal"
    )]
    pub car_owner_split_percent: Decimal,
}

impl MonthlyLedgerEntry {
    /// An entry for `month` with every amount zero.
    #[must_use]
    pub fn empty(month: Month) -> Self {
        Self {
            month: month.number(),
            ..Self::default()
        }
    }

    /// The owner's share as a fraction (`car_owner_split_percent / 100`).
    #[must_use]
    pub fn owner_percent(&self) -> Decimal {
        self.car_owner_split_percent / Decimal::ONE_HUNDRED
    }

    /// Every amount of the entry with its snapshot field name.
    #[must_use]
    pub fn amounts(&self) -> [(&'static str, Decimal); 12] {
        [
            ("rentalIncome", self.rental_income),
            ("deliveryIncome", self.delivery_income),
            ("electricPrepaidIncome", self.electric_prepaid_income),
            ("smokingFines", self.smoking_fines),
            ("gasPrepaidIncome", self.gas_prepaid_income),
            ("skiRacksIncome", self.ski_racks_income),
            ("milesIncome", self.miles_income),
            ("childSeatIncome", self.child_seat_income),
            ("coolersIncome", self.coolers_income),
            ("insuranceWreckIncome", self.insurance_wreck_income),
            ("otherIncome", self.other_income),
            ("carOwnerSplitPercent", self.car_owner_split_percent),
        ]
    }

    /// The validated month, if the raw number is in range.
    #[must_use]
    pub fn valid_month(&self) -> Option<Month> {
        Month::new(self.month).ok()
    }
}

/// The three expense categories tracked per car and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpenseCategory {
    /// Direct delivery costs.
    DirectDelivery,
    /// Cost of goods sold.
    Cogs,
    /// Parking fees and labor charged by the operator.
    ParkingFeeLabor,
}

impl ExpenseCategory {
    /// All categories, in snapshot order.
    pub const ALL: [Self; 3] = [Self::DirectDelivery, Self::Cogs, Self::ParkingFeeLabor];

    /// The snapshot key for this category.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::DirectDelivery => "directDelivery",
            Self::Cogs => "cogs",
            Self::ParkingFeeLabor => "parkingFeeLabor",
        }
    }

    /// The fixed line items summed for this category.
    ///
    /// Only these names count toward a category total. A snapshot field with
    /// any other name is kept on the row but contributes nothing, so an
    /// expense recorded under a name missing from this list is dropped from
    /// the split; the loader's check reports each such field (L003).
    #[must_use]
    pub const fn fixed_fields(self) -> &'static [&'static str] {
        match self {
            Self::DirectDelivery => &[
                "laborCarCleaning",
                "laborDelivery",
                "parkingAirport",
                "parkingLot",
                "uberLyftLime",
            ],
            Self::Cogs => &[
                "autoBodyShopWreck",
                "alignment",
                "battery",
                "brakes",
                "carPayment",
                "carInsurance",
                "carSeats",
                "cleaningSuppliesTools",
                "emissions",
                "gpsSystem",
                "keyFob",
                "laborCleaning",
                "licenseRegistration",
                "mechanic",
                "oilLube",
                "parts",
                "skiRacks",
                "tickets",
                "tiredAirStation",
                "tires",
                "towingImpoundFees",
                "uberLyftLime",
                "windshield",
                "wipers",
            ],
            Self::ParkingFeeLabor => &["glaParkingFee", "laborCleaning"],
        }
    }

    /// Whether `field` is one of this category's fixed line items.
    #[must_use]
    pub fn is_fixed_field(self, field: &str) -> bool {
        self.fixed_fields().contains(&field)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One month of an expense category's fixed line items.
///
/// Every key other than `month` is kept, including names that are not fixed
/// fields of the category, so that data-quality checks can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryRow {
    /// Raw month number from the snapshot.
    pub month: u32,
    /// Line item values by field name.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Decimal>,
}

impl CategoryRow {
    /// An empty row for `month`.
    #[must_use]
    pub fn new(month: Month) -> Self {
        Self {
            month: month.number(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a line item.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// The value of a line item, zero if absent.
    #[must_use]
    pub fn field(&self, name: &str) -> Decimal {
        self.fields.get(name).copied().unwrap_or(Decimal::ZERO)
    }
}

struct CategoryRowVisitor;

impl<'de> Visitor<'de> for CategoryRowVisitor {
    type Value = CategoryRow;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an expense row object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<CategoryRow, A::Error> {
        let mut row = CategoryRow {
            month: INVALID_MONTH,
            fields: BTreeMap::new(),
        };
        while let Some(key) = map.next_key::<String>()? {
            if key == "month" {
                row.month = map.next_value::<LenientMonth>()?.0;
            } else {
                let LenientDecimal(value) = map.next_value()?;
                row.fields.insert(key, value);
            }
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for CategoryRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CategoryRowVisitor)
    }
}

/// A single month's value of a dynamic subcategory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicValue {
    /// Raw month number.
    #[serde(default, deserialize_with = "lenient::month_number")]
    pub month: u32,
    /// The amount.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub value: Decimal,
}

/// A user-defined expense line item within a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSubcategory {
    /// Display name chosen by the user.
    #[serde(default)]
    pub name: String,
    /// Recorded values by month.
    #[serde(default)]
    pub values: Vec<DynamicValue>,
}

impl DynamicSubcategory {
    /// Create an empty subcategory.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Record a value for a month.
    #[must_use]
    pub fn with_value(mut self, month: Month, value: Decimal) -> Self {
        self.values.push(DynamicValue {
            month: month.number(),
            value,
        });
        self
    }

    /// The value recorded for `month` (first match), zero if none.
    #[must_use]
    pub fn value_for(&self, month: Month) -> Decimal {
        self.values
            .iter()
            .find(|v| v.month == month.number())
            .map_or(Decimal::ZERO, |v| v.value)
    }
}

/// Dynamic subcategories, grouped by expense category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicSubcategories {
    /// Subcategories of [`ExpenseCategory::DirectDelivery`].
    #[serde(default)]
    pub direct_delivery: Vec<DynamicSubcategory>,
    /// Subcategories of [`ExpenseCategory::Cogs`].
    #[serde(default)]
    pub cogs: Vec<DynamicSubcategory>,
    /// Subcategories of [`ExpenseCategory::ParkingFeeLabor`].
    #[serde(default)]
    pub parking_fee_labor: Vec<DynamicSubcategory>,
}

impl DynamicSubcategories {
    /// The subcategories of `category`.
    #[must_use]
    pub fn get(&self, category: ExpenseCategory) -> &[DynamicSubcategory] {
        match category {
            ExpenseCategory::DirectDelivery => &self.direct_delivery,
            ExpenseCategory::Cogs => &self.cogs,
            ExpenseCategory::ParkingFeeLabor => &self.parking_fee_labor,
        }
    }

    fn get_mut(&mut self, category: ExpenseCategory) -> &mut Vec<DynamicSubcategory> {
        match category {
            ExpenseCategory::DirectDelivery => &mut self.direct_delivery,
            ExpenseCategory::Cogs => &mut self.cogs,
            ExpenseCategory::ParkingFeeLabor => &mut self.parking_fee_labor,
        }
    }
}

/// Everything recorded for one car in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarLedger {
    /// The car's identifier; numeric ids are kept as their decimal text.
    #[serde(deserialize_with = "lenient::identifier")]
    pub car_id: String,
    /// The ledger year.
    pub year: i32,
    /// Monthly income rows.
    #[serde(default)]
    pub income_expenses: Vec<MonthlyLedgerEntry>,
    /// Direct delivery rows.
    #[serde(default)]
    pub direct_delivery: Vec<CategoryRow>,
    /// Cost of goods sold rows.
    #[serde(default)]
    pub cogs: Vec<CategoryRow>,
    /// Parking fee and labor rows.
    #[serde(default)]
    pub parking_fee_labor: Vec<CategoryRow>,
    /// User-defined subcategories.
    #[serde(default)]
    pub dynamic_subcategories: DynamicSubcategories,
    /// Split mode and ski-rack ownership settings.
    #[serde(default, alias = "formulaSettings")]
    pub formula_setting: FormulaSettings,
}

impl CarLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new(car_id: impl Into<String>, year: i32) -> Self {
        Self {
            car_id: car_id.into(),
            year,
            income_expenses: Vec::new(),
            direct_delivery: Vec::new(),
            cogs: Vec::new(),
            parking_fee_labor: Vec::new(),
            dynamic_subcategories: DynamicSubcategories::default(),
            formula_setting: FormulaSettings::default(),
        }
    }

    /// Add a monthly income row.
    #[must_use]
    pub fn with_entry(mut self, entry: MonthlyLedgerEntry) -> Self {
        self.income_expenses.push(entry);
        self
    }

    /// Add an expense row to a category.
    #[must_use]
    pub fn with_category_row(mut self, category: ExpenseCategory, row: CategoryRow) -> Self {
        self.category_rows_mut(category).push(row);
        self
    }

    /// Add a dynamic subcategory to a category.
    #[must_use]
    pub fn with_dynamic_subcategory(
        mut self,
        category: ExpenseCategory,
        subcategory: DynamicSubcategory,
    ) -> Self {
        self.dynamic_subcategories
            .get_mut(category)
            .push(subcategory);
        self
    }

    /// Replace the formula settings.
    #[must_use]
    pub fn with_formula_settings(mut self, settings: FormulaSettings) -> Self {
        self.formula_setting = settings;
        self
    }

    /// The income row for `month` (first match).
    #[must_use]
    pub fn entry(&self, month: Month) -> Option<&MonthlyLedgerEntry> {
        self.income_expenses
            .iter()
            .find(|e| e.month == month.number())
    }

    /// The income row for `month`, or an all-zero row if none was recorded.
    #[must_use]
    pub fn entry_or_empty(&self, month: Month) -> MonthlyLedgerEntry {
        self.entry(month)
            .copied()
            .unwrap_or_else(|| MonthlyLedgerEntry::empty(month))
    }

    /// The fixed-field rows of a category.
    #[must_use]
    pub fn category_rows(&self, category: ExpenseCategory) -> &[CategoryRow] {
        match category {
            ExpenseCategory::DirectDelivery => &self.direct_delivery,
            ExpenseCategory::Cogs => &self.cogs,
            ExpenseCategory::ParkingFeeLabor => &self.parking_fee_labor,
        }
    }

    fn category_rows_mut(&mut self, category: ExpenseCategory) -> &mut Vec<CategoryRow> {
        match category {
            ExpenseCategory::DirectDelivery => &mut self.direct_delivery,
            ExpenseCategory::Cogs => &mut self.cogs,
            ExpenseCategory::ParkingFeeLabor => &mut self.parking_fee_labor,
        }
    }

    /// The fixed-field row of a category for `month` (first match).
    #[must_use]
    pub fn category_row(&self, category: ExpenseCategory, month: Month) -> Option<&CategoryRow> {
        self.category_rows(category)
            .iter()
            .find(|r| r.month == month.number())
    }

    /// The dynamic subcategories of a category.
    #[must_use]
    pub fn dynamic_subcategories(&self, category: ExpenseCategory) -> &[DynamicSubcategory] {
        self.dynamic_subcategories.get(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn month(n: u32) -> Month {
        Month::new(n).unwrap()
    }

    #[test]
    fn test_owner_percent() {
        let mut entry = MonthlyLedgerEntry::empty(month(1));
        entry.car_owner_split_percent = dec!(55);
        assert_eq!(entry.owner_percent(), dec!(0.55));
    }

    #[test]
    fn test_entry_lookup_first_match() {
        let mut first = MonthlyLedgerEntry::empty(month(2));
        first.rental_income = dec!(100);
        let mut second = MonthlyLedgerEntry::empty(month(2));
        second.rental_income = dec!(999);

        let ledger = CarLedger::new("c", 2024).with_entry(first).with_entry(second);
        assert_eq!(ledger.entry_or_empty(month(2)).rental_income, dec!(100));
        assert_eq!(ledger.entry_or_empty(month(3)), MonthlyLedgerEntry::empty(month(3)));
    }

    #[test]
    fn test_decode_entry() {
        let json = r#"{
            "month": 3,
            "rentalIncome": "1500.25",
            "milesIncome": 40,
            "smokingFines": null,
            "otherIncome": "oops",
            "carOwnerSplit": 60
        }"#;
        let entry: MonthlyLedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.valid_month(), Some(month(3)));
        assert_eq!(entry.rental_income, dec!(1500.25));
        assert_eq!(entry.miles_income, dec!(40));
        assert_eq!(entry.smoking_fines, Decimal::ZERO);
        assert_eq!(entry.other_income, Decimal::ZERO);
        assert_eq!(entry.owner_percent(), dec!(0.6));
    }

    #[test]
    fn test_decode_category_row_keeps_unknown_fields() {
        let json = r#"{"month": "5", "tires": 120, "tyres": "80", "parts": null}"#;
        let row: CategoryRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.month, 5);
        assert_eq!(row.field("tires"), dec!(120));
        assert_eq!(row.field("tyres"), dec!(80));
        assert_eq!(row.field("parts"), Decimal::ZERO);
        assert_eq!(row.field("brakes"), Decimal::ZERO);
    }

    #[test]
    fn test_dynamic_value_first_match() {
        let sub = DynamicSubcategory::new("Detailing")
            .with_value(month(3), dec!(50))
            .with_value(month(3), dec!(75));
        assert_eq!(sub.value_for(month(3)), dec!(50));
        assert_eq!(sub.value_for(month(4)), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_fields() {
        assert!(ExpenseCategory::ParkingFeeLabor.is_fixed_field("glaParkingFee"));
        assert!(!ExpenseCategory::DirectDelivery.is_fixed_field("glaParkingFee"));
        assert!(ExpenseCategory::Cogs.is_fixed_field("tires"));
    }

    #[test]
    fn test_decode_full_ledger() {
        let json = r#"{
            "carId": "tesla-3",
            "year": 2026,
            "incomeExpenses": [{"month": 1, "rentalIncome": 900, "carOwnerSplitPercent": 50}],
            "cogs": [{"month": 1, "tires": 100}],
            "dynamicSubcategories": {
                "cogs": [{"name": "Detailing", "values": [{"month": 1, "value": "25"}]}]
            },
            "formulaSetting": {"monthModes": {"1": 70}}
        }"#;
        let ledger: CarLedger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.car_id, "tesla-3");
        assert_eq!(ledger.category_rows(ExpenseCategory::Cogs).len(), 1);
        assert!(ledger.category_rows(ExpenseCategory::DirectDelivery).is_empty());
        assert_eq!(
            ledger.dynamic_subcategories(ExpenseCategory::Cogs)[0].value_for(Month::JANUARY),
            dec!(25)
        );
        assert_eq!(
            ledger.formula_setting.mode(Month::JANUARY),
            crate::SplitMode::Mode70
        );
    }

    #[test]
    fn test_decode_admin_export_quirks() {
        let json = r#"{
            "carId": 100,
            "year": 2026,
            "incomeExpenses": [{"month": 2, "rentalIncome": 400}],
            "formulaSetting": {"monthModes": [], "skiRacksOwner": []}
        }"#;
        let ledger: CarLedger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.car_id, "100");
        assert_eq!(ledger.entry_or_empty(month(2)).rental_income, dec!(400));
        assert_eq!(ledger.formula_setting, FormulaSettings::default());
    }
}
