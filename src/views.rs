//! View-models handed to the presentation layer, assembled from the
//! persistence layer and the budget/spend/savings engine.

use crate::budget::{
    applicable_budgets_by_category, effective_budget_totals, one_time_totals_by_month,
    recurring_total,
};
use crate::db::Db;
use crate::domain::{Category, Session, Transaction, TxnKind};
use crate::month::normalize_month;
use crate::savings::{SavingsRow, project_savings};
use crate::spend::{BudgetCard, CategoryFlows, IncomeBar, budget_cards, net_spend};
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: TxnKind,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl TransactionRow {
    pub fn new(txn: &Transaction, category: &Category) -> Self {
        Self {
            id: txn.id,
            date: txn.date,
            kind: txn.kind,
            category: category.name.clone(),
            amount: txn.amount,
            description: txn.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub month: String,
    pub months_options: Vec<String>,
    pub cards: Vec<BudgetCard>,
    pub unbudgeted_spent: Decimal,
    pub income_bar: IncomeBar,
    pub recent_transactions: Vec<TransactionRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AnalyticsView {
    pub months: Vec<String>,
    pub income: Vec<Decimal>,
    pub expenses: Vec<Decimal>,
    pub budgeted: Vec<Decimal>,
    pub savings: Vec<Decimal>,
}

impl AnalyticsView {
    pub fn from_rows(rows: Vec<SavingsRow>) -> Self {
        let mut view = Self::default();
        for row in rows {
            view.months.push(row.month);
            view.income.push(row.income);
            view.expenses.push(row.expenses);
            view.budgeted.push(row.budgeted);
            view.savings.push(row.savings);
        }
        view
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMonthView {
    pub category: Category,
    pub month: String,
    pub transactions: Vec<TransactionRow>,
    pub total_expense: Decimal,
    pub total_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnbudgetedView {
    pub month: String,
    pub transactions: Vec<TransactionRow>,
    pub total: Decimal,
}

pub fn month_flows(db: &Db, session: &Session, month: &str) -> Result<CategoryFlows> {
    Ok(CategoryFlows {
        expenses: db.category_sums_for_month(session.user_id, month, TxnKind::Expense)?,
        income: db.category_sums_for_month(session.user_id, month, TxnKind::Income)?,
    })
}

pub fn build_dashboard(
    db: &Db,
    session: &Session,
    month: &str,
    months_options: Vec<String>,
    recent_limit: usize,
) -> Result<DashboardView> {
    let budgets = db.list_budgets_with_category(session.user_id)?;
    let totals = effective_budget_totals(&budgets, month);
    let flows = month_flows(db, session, month)?;
    let spend = net_spend(&totals, &flows);
    debug!(month, budgeted = totals.len(), "built dashboard");

    let recent_transactions = db
        .list_transactions(session.user_id, Some(recent_limit))?
        .iter()
        .map(|(t, c)| TransactionRow::new(t, c))
        .collect();

    Ok(DashboardView {
        month: month.to_string(),
        months_options,
        cards: budget_cards(&totals, &flows),
        unbudgeted_spent: spend.unbudgeted_total,
        income_bar: spend.income_bar,
        recent_transactions,
    })
}

pub fn build_analytics(db: &Db, session: &Session) -> Result<AnalyticsView> {
    let flows = db.monthly_flows(session.user_id)?;
    let budgets = db.list_budgets_with_category(session.user_id)?;

    let mut seeds: BTreeMap<String, Decimal> = BTreeMap::new();
    for seed in db.list_savings_starts(session.user_id)? {
        if let Some(month) = normalize_month(Some(&seed.month)) {
            seeds.insert(month, seed.amount);
        }
    }

    let rows = project_savings(
        flows,
        recurring_total(&budgets),
        &one_time_totals_by_month(&budgets),
        &seeds,
    );
    Ok(AnalyticsView::from_rows(rows))
}

pub fn build_category_month(
    db: &Db,
    session: &Session,
    category: Category,
    month: &str,
) -> Result<CategoryMonthView> {
    let txns = db.list_category_transactions(session.user_id, category.id, month)?;

    let mut total_expense = Decimal::ZERO;
    let mut total_income = Decimal::ZERO;
    for t in &txns {
        match t.kind {
            TxnKind::Expense => total_expense += t.amount,
            TxnKind::Income => total_income += t.amount,
        }
    }

    let transactions = txns
        .iter()
        .map(|t| TransactionRow::new(t, &category))
        .collect();

    Ok(CategoryMonthView {
        category,
        month: month.to_string(),
        transactions,
        total_expense,
        total_income,
    })
}

/// Expense transactions of the month in categories with no applicable
/// budget, using the single-winner selection rule.
pub fn build_unbudgeted(db: &Db, session: &Session, month: &str) -> Result<UnbudgetedView> {
    let budgets = db.list_budgets_with_category(session.user_id)?;
    let budgeted = applicable_budgets_by_category(&budgets, month);

    let transactions: Vec<TransactionRow> = db
        .list_month_transactions(session.user_id, month, TxnKind::Expense)?
        .iter()
        .filter(|(t, _)| !budgeted.contains_key(&t.category_id))
        .map(|(t, c)| TransactionRow::new(t, c))
        .collect();
    let total = transactions.iter().map(|t| t.amount).sum();

    Ok(UnbudgetedView {
        month: month.to_string(),
        transactions,
        total,
    })
}
