//! End-to-end tests driving the built binaries.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixtures_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn payable(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_osplit-payable"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run osplit-payable")
}

fn report(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_osplit-report"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run osplit-report")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn fleet() -> String {
    fixtures_path("fleet").display().to_string()
}

#[test]
fn test_payable_each_month() {
    let cases = [
        ("1", "Car 100, January 2026: 750.00 USD"),
        ("2", "Car 100, February 2026: 425.00 USD"),
        ("3", "Car 100, March 2026: 550.00 USD"),
        ("4", "Car 100, April 2026: 0.00 USD"),
    ];
    for (month, expected) in cases {
        let output = payable(&[&fleet(), "--car", "100", "--year", "2026", "--month", month]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(stdout(&output).trim(), expected);
    }
}

#[test]
fn test_payable_legacy_years() {
    let output = payable(&[&fleet(), "--car", "100", "--year", "2025", "--month", "12"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Car 100, December 2025: 150.00 USD");

    // String amounts in the snapshot
    let output = payable(&[&fleet(), "--car", "200", "--year", "2025", "--month", "4"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Car 200, April 2025: 520.00 USD");
}

#[test]
fn test_payable_rounding() {
    // 40 of ski racks owned by the owner plus half of 960.25
    let output = payable(&[&fleet(), "--car", "300", "--year", "2026", "--month", "7"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Car 300, July 2026: 520.13 USD");

    let output = payable(&[
        &fleet(),
        "--car",
        "300",
        "--year",
        "2026",
        "--month",
        "7",
        "--precision",
        "0",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Car 300, July 2026: 520 USD");
}

#[test]
fn test_payable_missing_ledger_is_a_warning() {
    let output = payable(&[&fleet(), "--car", "999", "--year", "2026", "--month", "5"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Car 999, May 2026: 0.00 USD");
    assert!(stderr(&output).contains("ledger not found"));
}

#[test]
fn test_payable_before_2019() {
    let output = payable(&[&fleet(), "--car", "100", "--year", "2017", "--month", "5"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Car 100, May 2017: 0.00 USD");
    assert!(!stderr(&output).contains("ledger not found"));
}

#[test]
fn test_payable_invalid_month_rejected() {
    let output = payable(&[&fleet(), "--car", "100", "--year", "2026", "--month", "13"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("13"));
}

#[test]
fn test_payable_missing_path() {
    let output = payable(&[
        "/nonexistent/snapshots",
        "--car",
        "100",
        "--year",
        "2026",
        "--month",
        "1",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("error:"));
}

#[test]
fn test_payable_json() {
    let output = payable(&[
        &fleet(),
        "--car",
        "100",
        "--year",
        "2026",
        "--month",
        "1",
        "--format",
        "json",
        "--explain",
    ]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["status"], "due");
    assert_eq!(json["amount"], "750.00");
    assert_eq!(json["currency"], "USD");
    assert_eq!(json["month"], 1);
    assert_eq!(json["prior_year_ledger_found"], true);
    assert_eq!(json["breakdown"]["mode"], 50);
    assert_eq!(json["breakdown"]["totals"]["cogs"], "500");

    let output = payable(&[
        &fleet(),
        "--car",
        "999",
        "--year",
        "2026",
        "--month",
        "1",
        "--format",
        "json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["status"], "ledger_not_found");
    assert_eq!(json["amount"], "0.00");
    assert!(json.get("breakdown").is_none());
}

#[test]
fn test_payable_explain() {
    let output = payable(&[
        &fleet(),
        "--car",
        "100",
        "--year",
        "2026",
        "--month",
        "3",
        "--explain",
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Car 100, March 2026: 550.00 USD\n"));
    assert!(text.contains("Split mode"));
    assert!(text.contains("70"));
    assert!(text.contains("no income"));
}

#[test]
fn test_report_schedule() {
    let output = report(&[&fleet(), "schedule", "--car", "100", "--year", "2026"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    let months: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("January") || l.starts_with("December"))
        .collect();
    assert_eq!(months.len(), 2);
    assert!(months[0].ends_with("750.00"));
    // 750 + 425 + 550
    assert!(text.lines().last().unwrap().ends_with("1725.00"));
}

#[test]
fn test_report_schedule_missing_ledger() {
    let output = report(&[&fleet(), "schedule", "--car", "999", "--year", "2026"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ledger not found for car 999, year 2026"));
}

#[test]
fn test_report_categories() {
    let output = report(&[&fleet(), "categories", "--car", "100", "--year", "2026"]);
    assert!(output.status.success());

    let text = stdout(&output);
    let february = text.lines().find(|l| l.starts_with("February")).unwrap();
    assert!(february.ends_with("100.00"));
    assert!(text.lines().last().unwrap().ends_with("600.00"));
}

#[test]
fn test_report_cars() {
    let output = report(&[&fleet(), "cars"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("cars-2025.json"));
    assert!(text.contains("car-300-2026.json"));
    assert!(text.contains("Total: 4 snapshot(s)"));
}

#[test]
fn test_report_check_clean() {
    let output = report(&[&fleet(), "check"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("4 snapshot(s) checked: 0 error(s), 0 warning(s)"));
}

#[test]
fn test_report_check_dirty() {
    let path = fixtures_path("dirty/snapshots.json").display().to_string();
    let output = report(&[&path, "check"]);
    assert_eq!(output.status.code(), Some(1));

    let text = stdout(&output);
    assert!(text.contains("L001"));
    assert!(text.contains("L002"));
    assert!(text.contains("L003"));
    assert!(text.contains("carWash"));
    assert!(text.contains("warning: O001"));
    assert!(text.contains("1 error(s), 3 warning(s)"));
}

#[test]
fn test_dirty_snapshot_still_resolves() {
    let path = fixtures_path("dirty/snapshots.json").display().to_string();
    let output = payable(&[&path, "--car", "500", "--year", "2026", "--month", "3"]);
    assert!(output.status.success());
    // The first March row is used; the currency comes from the bundle
    assert_eq!(stdout(&output).trim(), "Car 500, March 2026: 50.00 CAD");
    assert!(stderr(&output).contains("O001"));
}
