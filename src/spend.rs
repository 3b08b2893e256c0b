//! Net spend for a month: expenses minus same-category income.
//!
//! Everything here stays in `Decimal`; only the percentages handed to the
//! presentation layer are `f64`.

use crate::budget::BudgetTotal;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Upper bound for displayed percentages.
pub const PERCENT_CAP: f64 = 999.0;

/// Expenses may run this far past income (in percent) before being flagged.
pub const OVERSPEND_THRESHOLD: f64 = 102.0;

/// Per-category expense and income sums for one month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFlows {
    pub expenses: BTreeMap<i64, Decimal>,
    pub income: BTreeMap<i64, Decimal>,
}

impl CategoryFlows {
    pub fn expense(&self, category_id: i64) -> Decimal {
        self.expenses.get(&category_id).copied().unwrap_or_default()
    }

    pub fn income(&self, category_id: i64) -> Decimal {
        self.income.get(&category_id).copied().unwrap_or_default()
    }

    /// Expense minus income, floored at zero: refunds never push a
    /// category's spend negative.
    pub fn net_spent(&self, category_id: i64) -> Decimal {
        (self.expense(category_id) - self.income(category_id)).max(Decimal::ZERO)
    }

    pub fn total_expenses(&self) -> Decimal {
        self.expenses.values().copied().sum()
    }

    pub fn total_income(&self) -> Decimal {
        self.income.values().copied().sum()
    }

    fn category_ids(&self) -> BTreeSet<i64> {
        self.expenses.keys().chain(self.income.keys()).copied().collect()
    }
}

/// `part / whole * 100`, zero when `whole` is not positive, capped for display.
pub fn display_percent(part: Decimal, whole: Decimal) -> f64 {
    if whole <= Decimal::ZERO {
        return 0.0;
    }
    let pct = (part / whole * Decimal::ONE_HUNDRED).to_f64().unwrap_or(PERCENT_CAP);
    pct.min(PERCENT_CAP)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetCard {
    pub category_id: i64,
    pub category_name: String,
    pub budget_amount: Decimal,
    pub net_spent: Decimal,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeBar {
    pub income: Decimal,
    pub expenses: Decimal,
    pub percent: f64,
    pub over: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetSpend {
    /// Net spend for every category that saw activity this month.
    pub per_category: BTreeMap<i64, Decimal>,
    pub unbudgeted_total: Decimal,
    pub income_bar: IncomeBar,
}

/// One card per budgeted category, sorted case-insensitively by name.
pub fn budget_cards(
    budgets: &BTreeMap<i64, BudgetTotal>,
    flows: &CategoryFlows,
) -> Vec<BudgetCard> {
    let mut cards: Vec<BudgetCard> = budgets
        .iter()
        .map(|(&category_id, total)| {
            let net_spent = flows.net_spent(category_id);
            BudgetCard {
                category_id,
                category_name: total.category_name.clone(),
                budget_amount: total.amount,
                net_spent,
                percent: display_percent(net_spent, total.amount),
            }
        })
        .collect();
    cards.sort_by_key(|c| c.category_name.to_lowercase());
    cards
}

/// Net spend over categories that have no aggregated budget this month.
pub fn unbudgeted_total(budgets: &BTreeMap<i64, BudgetTotal>, flows: &CategoryFlows) -> Decimal {
    flows
        .expenses
        .keys()
        .filter(|id| !budgets.contains_key(id))
        .map(|&id| flows.net_spent(id))
        .sum()
}

pub fn income_bar(flows: &CategoryFlows) -> IncomeBar {
    let income = flows.total_income();
    let expenses = flows.total_expenses();
    let percent = display_percent(expenses, income);
    IncomeBar {
        income,
        expenses,
        percent,
        over: percent > OVERSPEND_THRESHOLD,
    }
}

pub fn net_spend(budgets: &BTreeMap<i64, BudgetTotal>, flows: &CategoryFlows) -> NetSpend {
    let per_category = flows
        .category_ids()
        .into_iter()
        .map(|id| (id, flows.net_spent(id)))
        .collect();
    NetSpend {
        per_category,
        unbudgeted_total: unbudgeted_total(budgets, flows),
        income_bar: income_bar(flows),
    }
}
