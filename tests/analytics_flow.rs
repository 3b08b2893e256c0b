use assert_cmd::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;
use std::process::Command;

fn budgetbook_cmd(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("budgetbook"));
    cmd.env("BUDGETBOOK_HOME", home.path());
    cmd.env("BUDGETBOOK_TODAY", "2025-09-15");
    cmd.env_remove("BUDGETBOOK_LOG");
    cmd
}

fn run_ok(home: &tempfile::TempDir, args: &[&str]) {
    budgetbook_cmd(home).args(args).assert().success();
}

fn run_ok_out(home: &tempfile::TempDir, args: &[&str]) -> String {
    let out = budgetbook_cmd(home)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).expect("utf8 stdout")
}

fn decimals(v: &Value) -> Vec<Decimal> {
    v.as_array()
        .expect("array")
        .iter()
        .map(|x| x.as_str().expect("string").parse().expect("decimal"))
        .collect()
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

fn three_month_home() -> tempfile::TempDir {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(&home, &["user", "register", "ana@example.com"]);
    run_ok(&home, &["user", "login", "ana@example.com"]);
    run_ok(&home, &["category", "add", "Rent", "--icon", "house"]);
    run_ok(&home, &["category", "add", "Food", "--icon", "utensils"]);

    run_ok(&home, &["txn", "add", "income", "General", "1000", "--date", "2025-07-01"]);
    run_ok(&home, &["txn", "add", "expense", "Rent", "800", "--date", "2025-07-03"]);
    run_ok(&home, &["txn", "add", "income", "General", "500", "--date", "2025-08-01"]);
    run_ok(&home, &["txn", "add", "expense", "Food", "400", "--date", "2025-08-20"]);
    run_ok(&home, &["txn", "add", "income", "General", "100", "--date", "2025-09-10"]);

    run_ok(
        &home,
        &["budget", "set", "Rent", "900", "--recurrence", "monthly"],
    );
    run_ok(&home, &["budget", "set", "Food", "100", "--month", "2025-08"]);
    home
}

#[test]
fn analytics_accumulates_monthly_savings() {
    let home = three_month_home();

    let out = run_ok_out(&home, &["analytics", "--json"]);
    let view: Value = serde_json::from_str(&out).expect("json");

    let months: Vec<&str> = view["months"]
        .as_array()
        .expect("months")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(months, vec!["2025-07", "2025-08", "2025-09"]);
    assert_eq!(decimals(&view["income"]), vec![dec(1000), dec(500), dec(100)]);
    assert_eq!(decimals(&view["expenses"]), vec![dec(800), dec(400), dec(0)]);
    assert_eq!(decimals(&view["budgeted"]), vec![dec(900), dec(1000), dec(900)]);
    assert_eq!(decimals(&view["savings"]), vec![dec(200), dec(300), dec(400)]);
}

#[test]
fn starting_savings_resets_the_running_balance() {
    let home = three_month_home();

    let out = run_ok_out(&home, &["savings", "set", "2025-8", "1000"]);
    assert!(out.contains("Starting savings set."), "savings set: {out}");
    let out = run_ok_out(&home, &["savings", "set", "2025-08-01", "2000"]);
    assert!(out.contains("Starting savings updated."), "savings set: {out}");

    // A seed for a month with no activity adds no row.
    run_ok(&home, &["savings", "set", "2024-01", "5"]);

    let out = run_ok_out(&home, &["savings", "list"]);
    assert!(out.contains("2025-08\t2000.00"), "savings list: {out}");

    let out = run_ok_out(&home, &["analytics", "--json"]);
    let view: Value = serde_json::from_str(&out).expect("json");
    assert_eq!(view["months"].as_array().map(Vec::len), Some(3));
    assert_eq!(decimals(&view["savings"]), vec![dec(200), dec(2100), dec(2200)]);
}

#[test]
fn analytics_without_transactions_is_empty() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(&home, &["user", "register", "ana@example.com"]);
    run_ok(&home, &["user", "login", "ana@example.com"]);

    let out = run_ok_out(&home, &["analytics"]);
    assert_eq!(out.trim(), "(no transactions)");
}
