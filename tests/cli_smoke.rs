use assert_cmd::prelude::*;
use predicates::prelude::*;
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

#[test]
fn commands_require_login() {
    let home = tempfile::tempdir().expect("tempdir");

    budgetbook_cmd(&home)
        .args(["dashboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn register_login_whoami_logout() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(&home, &["user", "register", "Ana@Example.com"]);
    assert!(out.contains("ana@example.com"), "register output: {out}");

    budgetbook_cmd(&home)
        .args(["user", "register", "ana@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Email already registered"));

    run_ok(&home, &["user", "login", "ana@example.com"]);
    let out = run_ok_out(&home, &["user", "whoami"]);
    assert_eq!(out.trim(), "ana@example.com");

    // Registration seeds a default category.
    let out = run_ok_out(&home, &["category", "list"]);
    assert!(out.contains("General"), "categories: {out}");

    run_ok(&home, &["user", "logout"]);
    let out = run_ok_out(&home, &["user", "whoami"]);
    assert_eq!(out.trim(), "(not logged in)");
}

#[test]
fn login_with_unknown_email_is_not_found() {
    let home = tempfile::tempdir().expect("tempdir");

    budgetbook_cmd(&home)
        .args(["user", "login", "nobody@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User not found."));
}

#[test]
fn budget_months_follow_picker_window() {
    let home = tempfile::tempdir().expect("tempdir");
    run_ok(&home, &["user", "register", "ana@example.com"]);
    run_ok(&home, &["user", "login", "ana@example.com"]);

    let out = run_ok_out(&home, &["budget", "months"]);
    let months: Vec<&str> = out.lines().collect();
    assert_eq!(months.first(), Some(&"2025-08"));
    assert_eq!(months.last(), Some(&"2026-09"));
    assert_eq!(months.len(), 14);
}

#[test]
fn icons_are_listed_without_login() {
    let home = tempfile::tempdir().expect("tempdir");
    let out = run_ok_out(&home, &["category", "icons"]);
    assert!(out.contains("tag\tTag"));
    assert!(out.contains("piggy-bank\tSavings"));
}
