//! Integration tests for the loader crate.

use ownersplit_core::{ExpenseCategory, Month};
use ownersplit_loader::{load, LoadError, Loader, Rounding, Severity};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs;
use std::path::Path;

fn fixtures_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn month(n: u32) -> Month {
    Month::new(n).unwrap()
}

#[test]
fn test_load_directory() {
    let result = load(&fixtures_path("fleet")).expect("should load fleet directory");

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert!(result.issues.is_empty(), "unexpected issues: {:?}", result.issues);

    // Options come from options.json
    assert_eq!(result.options.title.as_deref(), Some("Fleet"));
    assert_eq!(result.options.currency, "USD");
    assert!(result.options.warnings.is_empty());

    // archive/ is not visited without recursion
    assert_eq!(result.store.len(), 3);
    assert!(result.store.contains("100", 2026));
    assert!(result.store.contains("100", 2025));
    assert!(result.store.contains("200", 2025));
    assert!(!result.store.contains("100", 2019));

    // options.json plus two snapshot files; notes.txt is skipped
    assert_eq!(result.sources.len(), 3);
    assert_eq!(
        result.origins[&("200".to_string(), 2025)].file_name().unwrap(),
        "cars-2025.json"
    );
}

#[test]
fn test_load_directory_recursive() {
    let result = Loader::new()
        .with_recursive(true)
        .load(&fixtures_path("fleet"))
        .expect("should load fleet directory");

    assert!(result.errors.is_empty());
    assert_eq!(result.store.len(), 4);
    assert!(result.store.contains("100", 2019));
}

#[test]
fn test_snapshot_values_decoded() {
    let result = load(&fixtures_path("fleet")).unwrap();

    let ledger = result.store.get("100", 2026).unwrap();
    let feb = ledger.entry(month(2)).unwrap();
    assert_eq!(feb.rental_income, dec!(1000));
    assert_eq!(feb.delivery_income, dec!(200));
    assert_eq!(feb.car_owner_split_percent, dec!(60));
    assert_eq!(
        ledger
            .category_row(ExpenseCategory::Cogs, month(1))
            .unwrap()
            .field("carPayment"),
        dec!(500)
    );

    // String numbers
    let ledger = result.store.get("200", 2025).unwrap();
    let apr = ledger.entry(month(4)).unwrap();
    assert_eq!(apr.rental_income, dec!(1500.50));
    assert_eq!(apr.car_owner_split_percent, dec!(40));
    assert_eq!(
        ledger
            .category_row(ExpenseCategory::Cogs, month(4))
            .unwrap()
            .field("tires"),
        dec!(200.50)
    );
}

#[test]
fn test_load_bundle_with_options() {
    let result = load(&fixtures_path("bundle.json")).expect("should load bundle");

    assert!(result.errors.is_empty());
    assert_eq!(result.store.len(), 1);
    assert!(result.store.contains("300", 2026));

    assert_eq!(result.options.currency, "EUR");
    assert_eq!(result.options.rounding, Rounding::HalfEven);
    assert_eq!(result.options.warnings.len(), 1);
    assert_eq!(result.options.warnings[0].code, "O001");
    assert_eq!(result.options.warnings[0].option, "theme");
}

#[test]
fn test_messy_snapshot() {
    let result = load(&fixtures_path("messy.json")).expect("should load messy snapshot");
    assert!(result.errors.is_empty());

    let codes: Vec<&str> = result.issues.iter().map(|i| i.code).collect();
    assert_eq!(codes.iter().filter(|c| **c == "L001").count(), 2);
    assert_eq!(codes.iter().filter(|c| **c == "L002").count(), 1);
    assert_eq!(codes.iter().filter(|c| **c == "L003").count(), 1);
    assert_eq!(codes.iter().filter(|c| **c == "L004").count(), 1);
    assert_eq!(
        result
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count(),
        1
    );

    let ledger = result.store.get("400", 2024).unwrap();

    // Month 13 was dropped; the duplicate January stays and the first row wins
    assert_eq!(ledger.income_expenses.len(), 3);
    let jan = ledger.entry(month(1)).unwrap();
    assert_eq!(jan.rental_income, Decimal::ZERO);
    assert_eq!(jan.miles_income, Decimal::ZERO);

    // The "carOwnerSplit" alias is read
    assert_eq!(ledger.entry(month(2)).unwrap().car_owner_split_percent, dec!(150));

    // Unknown fields are kept on the row
    let row = ledger.category_row(ExpenseCategory::Cogs, month(2)).unwrap();
    assert_eq!(row.field("carPayment"), dec!(75));
    assert_eq!(row.field("detailing"), dec!(20));

    // The dynamic value with month "x" was dropped
    let wash = &ledger.dynamic_subcategories(ExpenseCategory::Cogs)[0];
    assert_eq!(wash.values.len(), 1);
    assert_eq!(wash.value_for(month(2)), dec!(12.5));

    // The "formulaSettings" alias is read and the bad month key ignored
    assert_eq!(
        ledger.formula_setting.mode(month(2)),
        ownersplit_core::SplitMode::Mode70
    );
}

#[test]
fn test_missing_path() {
    let result = load(Path::new("/nonexistent/snapshots"));
    assert!(matches!(result, Err(LoadError::Io { .. })));
}

#[test]
fn test_invalid_json_collected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.json"), "{ not json").unwrap();
    fs::write(
        dir.path().join("b.json"),
        r#"{"carId": "1", "year": 2026, "incomeExpenses": []}"#,
    )
    .unwrap();

    let result = load(dir.path()).expect("directory should load");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], LoadError::Json { .. }));
    assert!(result.has_errors());
    // The valid snapshot still loads
    assert!(result.store.contains("1", 2026));
}

#[test]
fn test_snapshot_without_car_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"[{"year": 2026}, {"carId": "ok", "year": 2026}]"#).unwrap();

    let result = load(&path).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], LoadError::Json { .. }));
    assert_eq!(result.store.len(), 1);
}

#[test]
fn test_unexpected_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("number.json");
    fs::write(&path, "42").unwrap();

    let result = load(&path).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], LoadError::Shape { .. }));

    fs::write(&path, r#"{"ledgers": {"carId": "1"}}"#).unwrap();
    let result = load(&path).unwrap();
    assert!(matches!(result.errors[0], LoadError::Shape { .. }));
}

#[test]
fn test_duplicate_snapshot_keeps_first() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a.json"),
        r#"{"carId": "7", "year": 2026, "incomeExpenses": [{"month": 1, "rentalIncome": 10}]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b.json"),
        r#"{"carId": "7", "year": 2026, "incomeExpenses": [{"month": 1, "rentalIncome": 99}]}"#,
    )
    .unwrap();

    let result = load(dir.path()).unwrap();
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        LoadError::DuplicateLedger {
            car_id, year, path, ..
        } => {
            assert_eq!(car_id, "7");
            assert_eq!(*year, 2026);
            assert_eq!(path.file_name().unwrap(), "b.json");
        }
        other => panic!("unexpected error: {other}"),
    }

    let ledger = result.store.get("7", 2026).unwrap();
    assert_eq!(ledger.entry(month(1)).unwrap().rental_income, dec!(10));
}

#[test]
fn test_invalid_option_values() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("options.json"),
        r#"{"display_precision": 20, "rounding": "sideways"}"#,
    )
    .unwrap();

    let result = load(dir.path()).unwrap();
    assert!(result.store.is_empty());
    assert_eq!(result.options.display_precision, 2);
    assert_eq!(result.options.warnings.len(), 2);
    assert!(result.options.warnings.iter().all(|w| w.code == "O002"));
}

#[test]
fn test_admin_export_quirks_still_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("export.json"),
        r#"{
            "carId": 100,
            "year": 2026,
            "incomeExpenses": [{"month": 2, "rentalIncome": 800, "carOwnerSplitPercent": 50}],
            "formulaSetting": {"monthModes": [], "skiRacksOwner": []}
        }"#,
    )
    .unwrap();

    let result = load(dir.path()).unwrap();
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let ledger = result.store.get("100", 2026).expect("numeric carId is keyed as text");
    assert_eq!(ledger.entry(month(2)).unwrap().rental_income, dec!(800));
    assert!(ledger.formula_setting.month_modes.is_empty());
    assert!(ledger.formula_setting.ski_racks_owner.is_empty());
}

#[test]
fn test_oversized_amounts_capped_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.json");
    fs::write(
        &path,
        r#"{
            "carId": "9",
            "year": 2026,
            "incomeExpenses": [{
                "month": 3,
                "rentalIncome": "79228162514264337593543950335",
                "deliveryIncome": "-79228162514264337593543950335"
            }]
        }"#,
    )
    .unwrap();

    let result = load(&path).unwrap();
    assert!(result.errors.is_empty());
    let entry = result.store.get("9", 2026).unwrap().entry(month(3)).unwrap();
    assert_eq!(entry.rental_income, dec!(1_000_000_000_000));
    assert_eq!(entry.delivery_income, dec!(-1_000_000_000_000));

    let capped: Vec<_> = result.issues.iter().filter(|i| i.code == "L005").collect();
    assert_eq!(capped.len(), 2);
    assert!(capped.iter().all(|i| i.severity == Severity::Warning));
}
