mod budget;
mod cli;
mod config;
mod db;
mod domain;
mod error;
mod month;
mod render;
mod savings;
mod spend;
mod views;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{BudgetCmd, CategoryCmd, Cli, Command, SavingsCmd, TxnCmd, UserCmd};
use crate::config::{AppConfig, app_paths, load_or_init_config, today_local, write_config};
use crate::db::Db;
use crate::domain::{
    Category, DEFAULT_CATEGORY, DEFAULT_ICON, NewTransaction, Recurrence, Session, Upsert,
    is_known_icon,
};
use crate::error::AppError;
use crate::month::{is_valid_month, month_of, months_options, normalize_month};

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("BUDGETBOOK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("budgetbook=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (mut cfg, cfg_path) = load_or_init_config(&paths)?;
    let today = cli.today.unwrap_or_else(today_local);
    let (mut db, db_path) = Db::open(&paths)?;
    debug!(db = %db_path.display(), %today, "starting");

    match cli.command {
        Command::User(args) => {
            handle_user(&mut db, args.cmd, &mut cfg, &cfg_path)?;
        }
        Command::Category(args) => {
            if let CategoryCmd::Icons = args.cmd {
                render::print_icons();
                return Ok(());
            }
            let session = require_session(&db, &cfg)?;
            handle_category(&db, &session, args.cmd, today)?;
        }
        Command::Txn(args) => {
            let session = require_session(&db, &cfg)?;
            handle_txn(&db, &session, args.cmd, today)?;
        }
        Command::Budget(args) => {
            let session = require_session(&db, &cfg)?;
            handle_budget(&db, &session, args.cmd, &cfg, today)?;
        }
        Command::Savings(args) => {
            let session = require_session(&db, &cfg)?;
            handle_savings(&db, &session, args.cmd)?;
        }
        Command::Dashboard(args) => {
            let session = require_session(&db, &cfg)?;
            let month = view_month(args.month.month.as_deref(), today);
            let options = months_options(
                today,
                &cfg.picker_start_from,
                cfg.dashboard_months_back,
                cfg.dashboard_months_ahead,
            );
            let view = views::build_dashboard(&db, &session, &month, options, cfg.recent_limit)?;
            if args.json {
                render::print_json(&view)?;
            } else {
                render::print_dashboard(&view);
            }
        }
        Command::Analytics(args) => {
            let session = require_session(&db, &cfg)?;
            let view = views::build_analytics(&db, &session)?;
            if args.json {
                render::print_json(&view)?;
            } else {
                render::print_analytics(&view);
            }
        }
        Command::Unbudgeted(args) => {
            let session = require_session(&db, &cfg)?;
            let month = view_month(args.month.as_deref(), today);
            let view = views::build_unbudgeted(&db, &session, &month)?;
            render::print_unbudgeted(&view);
        }
    }

    Ok(())
}

/// The logged-in user as an explicit session value.
fn require_session(db: &Db, cfg: &AppConfig) -> Result<Session> {
    let Some(email) = cfg.current_user.as_deref() else {
        return Err(AppError::NotLoggedIn.into());
    };
    let Some(user) = db.find_user_by_email(email)? else {
        return Err(AppError::NotLoggedIn.into());
    };
    Ok(Session {
        user_id: user.id,
        email: user.email,
    })
}

/// Month being viewed: the normalized `--month`, else the current month.
/// Malformed input is kept as-is and simply matches nothing.
fn view_month(raw: Option<&str>, today: NaiveDate) -> String {
    normalize_month(raw).unwrap_or_else(|| month_of(today))
}

/// Month for a write: normalized and required to be a real `YYYY-MM`.
fn write_month(raw: Option<&str>, today: NaiveDate) -> Result<String> {
    let month = view_month(raw, today);
    if !is_valid_month(&month) {
        return Err(AppError::InvalidMonth(month).into());
    }
    Ok(month)
}

fn non_negative(amount: Decimal) -> Result<Decimal> {
    if amount < Decimal::ZERO {
        return Err(AppError::NegativeAmount(amount).into());
    }
    Ok(amount)
}

fn check_icon(icon: &str) -> Result<()> {
    if !is_known_icon(icon) {
        return Err(AppError::UnknownIcon(icon.to_string()).into());
    }
    Ok(())
}

/// Looks a category up by name, falling back to a numeric id.
fn category_by_name(db: &Db, session: &Session, name: &str) -> Result<Category> {
    let name = name.trim();
    if let Some(category) = db.find_category_by_name(session.user_id, name)? {
        return Ok(category);
    }
    let by_id = match name.parse::<i64>() {
        Ok(id) => db.get_category(session.user_id, id)?,
        Err(_) => None,
    };
    by_id.ok_or_else(|| AppError::NotFound("Category").into())
}

fn handle_user(
    db: &mut Db,
    cmd: UserCmd,
    cfg: &mut AppConfig,
    cfg_path: &std::path::Path,
) -> Result<()> {
    match cmd {
        UserCmd::Register { email } => {
            let user = db.register_user(&email, DEFAULT_CATEGORY, DEFAULT_ICON)?;
            println!(
                "Account created for {}. Log in with: budgetbook user login {}",
                user.email, user.email
            );
        }
        UserCmd::Login { email } => {
            let Some(user) = db.find_user_by_email(email.trim())? else {
                return Err(AppError::NotFound("User").into());
            };
            cfg.current_user = Some(user.email.clone());
            write_config(cfg_path, cfg)?;
            info!(user_id = user.id, "logged in");
            println!("Welcome back, {}!", user.email);
        }
        UserCmd::Logout => {
            cfg.current_user = None;
            write_config(cfg_path, cfg)?;
            println!("Logged out.");
        }
        UserCmd::Whoami => match require_session(db, cfg) {
            Ok(session) => println!("{}", session.email),
            Err(_) => println!("(not logged in)"),
        },
    }
    Ok(())
}

fn handle_category(db: &Db, session: &Session, cmd: CategoryCmd, today: NaiveDate) -> Result<()> {
    match cmd {
        CategoryCmd::Add { name, icon } => {
            check_icon(&icon)?;
            let name = name.trim().to_string();
            db.insert_category(session.user_id, &name, &icon)?;
            println!("Category added.");
        }
        CategoryCmd::List => {
            render::print_categories(&db.list_categories(session.user_id)?);
        }
        CategoryCmd::Edit {
            name,
            new_name,
            icon,
        } => {
            let mut category = category_by_name(db, session, &name)?;
            if let Some(icon) = icon {
                check_icon(&icon)?;
                category.icon = icon;
            }
            if let Some(new_name) = new_name {
                category.name = new_name.trim().to_string();
            }
            db.update_category(&category)?;
            println!("Category updated.");
        }
        CategoryCmd::Delete { name } => {
            let category = category_by_name(db, session, &name)?;
            db.delete_category(session.user_id, category.id)?;
            println!("Category deleted.");
        }
        CategoryCmd::Show { name, month } => {
            let category = category_by_name(db, session, &name)?;
            let month = view_month(month.as_deref(), today);
            let view = views::build_category_month(db, session, category, &month)?;
            render::print_category_month(&view);
        }
        CategoryCmd::Icons => render::print_icons(),
    }
    Ok(())
}

fn handle_txn(db: &Db, session: &Session, cmd: TxnCmd, today: NaiveDate) -> Result<()> {
    match cmd {
        TxnCmd::Add {
            kind,
            category,
            amount,
            date,
            description,
        } => {
            let category = category_by_name(db, session, &category)?;
            let txn = NewTransaction {
                category_id: category.id,
                kind,
                amount: non_negative(amount)?,
                date: date.unwrap_or(today),
                description: description.filter(|d| !d.trim().is_empty()),
            };
            let id = db.insert_transaction(session.user_id, &txn)?;
            println!("Transaction saved (id {id}).");
        }
        TxnCmd::List => {
            let rows: Vec<views::TransactionRow> = db
                .list_transactions(session.user_id, None)?
                .iter()
                .map(|(t, c)| views::TransactionRow::new(t, c))
                .collect();
            render::print_transactions(&rows);
        }
        TxnCmd::Edit {
            id,
            kind,
            category,
            amount,
            date,
            description,
        } => {
            let Some(mut txn) = db.get_transaction(session.user_id, id)? else {
                return Err(AppError::NotFound("Transaction").into());
            };
            if let Some(kind) = kind {
                txn.kind = kind;
            }
            if let Some(name) = category {
                txn.category_id = category_by_name(db, session, &name)?.id;
            }
            if let Some(amount) = amount {
                txn.amount = non_negative(amount)?;
            }
            if let Some(date) = date {
                txn.date = date;
            }
            if let Some(description) = description {
                txn.description = Some(description).filter(|d| !d.trim().is_empty());
            }
            db.update_transaction(&txn)?;
            println!("Transaction updated.");
        }
        TxnCmd::Delete { id } => {
            db.delete_transaction(session.user_id, id)?;
            println!("Transaction deleted.");
        }
    }
    Ok(())
}

fn handle_budget(
    db: &Db,
    session: &Session,
    cmd: BudgetCmd,
    cfg: &AppConfig,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        BudgetCmd::Set {
            category,
            amount,
            month,
            recurrence,
        } => {
            let category = category_by_name(db, session, &category)?;
            let month = write_month(month.as_deref(), today)?;
            let amount = non_negative(amount)?;
            match db.upsert_budget(session.user_id, category.id, &month, amount, recurrence)? {
                Upsert::Inserted(id) => println!("Budget added (id {id})."),
                Upsert::Updated(id) => println!("Budget updated (id {id})."),
            }
        }
        BudgetCmd::List => {
            render::print_budgets(&db.list_budgets_with_category(session.user_id)?);
        }
        BudgetCmd::Edit {
            id,
            category,
            amount,
            recurrence,
            month,
        } => {
            let Some(mut budget) = db.get_budget(session.user_id, id)? else {
                return Err(AppError::NotFound("Budget").into());
            };
            if let Some(name) = category {
                budget.category_id = category_by_name(db, session, &name)?.id;
            }
            if let Some(amount) = amount {
                budget.amount = non_negative(amount)?;
            }
            if let Some(recurrence) = recurrence {
                budget.recurrence = recurrence;
            }
            if budget.recurrence == Recurrence::OneTime {
                let raw = month.as_deref().or(budget.month.as_deref());
                budget.month = Some(write_month(raw, today)?);
            }
            db.update_budget(&budget)?;
            println!("Budget updated.");
        }
        BudgetCmd::Delete { id } => {
            db.delete_budget(session.user_id, id)?;
            println!("Budget deleted.");
        }
        BudgetCmd::Months => {
            for m in months_options(
                today,
                &cfg.picker_start_from,
                cfg.budget_months_back,
                cfg.budget_months_ahead,
            ) {
                println!("{m}");
            }
        }
    }
    Ok(())
}

fn handle_savings(db: &Db, session: &Session, cmd: SavingsCmd) -> Result<()> {
    match cmd {
        SavingsCmd::Set { month, amount } => {
            let month = normalize_month(Some(&month))
                .filter(|m| is_valid_month(m))
                .ok_or(AppError::InvalidMonth(month))?;
            let amount = non_negative(amount)?;
            match db.upsert_savings_start(session.user_id, &month, amount)? {
                Upsert::Inserted(_) => println!("Starting savings set."),
                Upsert::Updated(_) => println!("Starting savings updated."),
            }
        }
        SavingsCmd::List => {
            render::print_savings_starts(&db.list_savings_starts(session.user_id)?);
        }
    }
    Ok(())
}
