use assert_cmd::prelude::*;
use predicates::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;
use std::process::Command;

const TODAY: &str = "2025-09-15";

fn budgetbook_cmd(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("budgetbook"));
    cmd.env("BUDGETBOOK_HOME", home.path());
    cmd.env("BUDGETBOOK_TODAY", TODAY);
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

fn run_json(home: &tempfile::TempDir, args: &[&str]) -> Value {
    let out = run_ok_out(home, args);
    serde_json::from_str(&out).expect("json stdout")
}

fn dec(v: &Value) -> Decimal {
    v.as_str()
        .expect("decimal encoded as string")
        .parse()
        .expect("decimal")
}

fn logged_in_home() -> tempfile::TempDir {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(&home, &["user", "register", "ana@example.com"]);
    run_ok(&home, &["user", "login", "ana@example.com"]);
    run_ok(&home, &["category", "add", "Food", "--icon", "utensils"]);
    run_ok(&home, &["category", "add", "Rent", "--icon", "house"]);
    home
}

#[test]
fn dashboard_sums_recurring_and_one_time_budgets() {
    let home = logged_in_home();

    run_ok(
        &home,
        &["budget", "set", "Food", "100", "--month", "2025-01", "--recurrence", "monthly"],
    );
    run_ok(&home, &["budget", "set", "Food", "50", "--month", "2025-9"]);

    run_ok(&home, &["txn", "add", "expense", "Food", "120", "--date", "2025-09-02"]);
    run_ok(&home, &["txn", "add", "income", "Food", "20", "--date", "2025-09-03"]);

    let view = run_json(&home, &["dashboard", "--json"]);
    assert_eq!(view["month"], "2025-09");

    let cards = view["cards"].as_array().expect("cards");
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["category_name"], "Food");
    assert_eq!(dec(&cards[0]["budget_amount"]), Decimal::from(150));
    assert_eq!(dec(&cards[0]["net_spent"]), Decimal::from(100));

    let options = view["months_options"].as_array().expect("options");
    assert_eq!(options.first().and_then(Value::as_str), Some("2025-07"));
    assert_eq!(options.last().and_then(Value::as_str), Some("2026-09"));
}

#[test]
fn unbudgeted_view_prefers_single_winning_budget() {
    let home = logged_in_home();

    run_ok(&home, &["budget", "set", "Rent", "900", "--month", "2025-08"]);
    run_ok(&home, &["txn", "add", "expense", "Rent", "700", "--date", "2025-09-01"]);
    run_ok(&home, &["txn", "add", "expense", "Food", "30", "--date", "2025-09-04"]);
    run_ok(&home, &["txn", "add", "income", "Food", "50", "--date", "2025-09-05"]);

    let out = run_ok_out(&home, &["unbudgeted"]);
    assert!(out.contains("unbudgeted\t730.00"), "unbudgeted output: {out}");

    // Dashboard floors Food at zero, so only rent counts.
    let view = run_json(&home, &["dashboard", "--json", "--month", "2025-09-20"]);
    assert_eq!(dec(&view["unbudgeted_spent"]), Decimal::from(700));
    assert_eq!(dec(&view["income_bar"]["income"]), Decimal::from(50));
    assert_eq!(view["income_bar"]["over"], true);
}

#[test]
fn setting_same_budget_twice_updates_in_place() {
    let home = logged_in_home();

    let out = run_ok_out(&home, &["budget", "set", "Food", "100"]);
    assert!(out.contains("Budget added"), "first set: {out}");

    let out = run_ok_out(&home, &["budget", "set", "Food", "80", "--month", "2025-09-01"]);
    assert!(out.contains("Budget updated"), "second set: {out}");

    let out = run_ok_out(&home, &["budget", "list"]);
    assert!(out.contains("80.00"), "budget list: {out}");
    assert!(!out.contains("100.00"), "budget list: {out}");
}

#[test]
fn budget_edit_and_delete_respect_ownership() {
    let home = logged_in_home();
    run_ok(&home, &["budget", "set", "Food", "100", "--month", "2025-09"]);

    run_ok(&home, &["budget", "edit", "1", "--amount", "75", "--month", "2025-10"]);
    let out = run_ok_out(&home, &["budget", "list"]);
    assert!(out.contains("2025-10"), "budget list: {out}");
    assert!(out.contains("75.00"), "budget list: {out}");

    run_ok(&home, &["user", "register", "bo@example.com"]);
    run_ok(&home, &["user", "login", "bo@example.com"]);
    budgetbook_cmd(&home)
        .args(["budget", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Budget not found."));

    run_ok(&home, &["user", "login", "ana@example.com"]);
    run_ok(&home, &["budget", "delete", "1"]);
    let out = run_ok_out(&home, &["budget", "list"]);
    assert!(out.contains("(no budgets)"), "budget list: {out}");
}

#[test]
fn budget_set_rejects_garbage_month() {
    let home = logged_in_home();
    budgetbook_cmd(&home)
        .args(["budget", "set", "Food", "10", "--month", "someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month"));
}
