//! Which budget applies to a category in a given month.
//!
//! Two rules answer that question and both are kept on purpose:
//!
//! - [`applicable_budgets_by_category`] picks one winning budget per
//!   category (one-time for the month beats recurring). Unbudgeted
//!   detection uses it.
//! - [`effective_budget_totals`] sums every monthly budget plus every
//!   one-time budget stored for exactly that month. Dashboard cards use it.

use crate::domain::{Budget, Category, Recurrence};
use crate::month::normalize_month;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Precedence between budgets competing for the same category and month.
/// Later variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BudgetRank {
    Recurring,
    OneTimeThisMonth,
}

/// How `budget` ranks for `month`, or `None` if it does not apply.
///
/// A one-time budget without a month is treated as belonging to whatever
/// month is being viewed.
pub fn rank_for_month(budget: &Budget, month: &str) -> Option<BudgetRank> {
    match budget.recurrence {
        Recurrence::Monthly => Some(BudgetRank::Recurring),
        Recurrence::OneTime => {
            let assumed = normalize_month(budget.month.as_deref());
            let assumed = assumed.as_deref().unwrap_or(month);
            (assumed == month).then_some(BudgetRank::OneTimeThisMonth)
        }
    }
}

/// Selection variant: the single winning budget per category id.
///
/// Amounts are never combined. On equal rank the first row wins.
pub fn applicable_budgets_by_category(
    rows: &[(Budget, Category)],
    month: &str,
) -> BTreeMap<i64, (Budget, Category)> {
    let mut chosen: BTreeMap<i64, (BudgetRank, &Budget, &Category)> = BTreeMap::new();

    for (budget, category) in rows {
        let Some(rank) = rank_for_month(budget, month) else {
            continue;
        };
        let replace = match chosen.get(&category.id) {
            None => true,
            Some((prev, _, _)) => rank > *prev,
        };
        if replace {
            chosen.insert(category.id, (rank, budget, category));
        }
    }

    chosen
        .into_iter()
        .map(|(id, (_, b, c))| (id, (b.clone(), c.clone())))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetTotal {
    pub category_name: String,
    pub amount: Decimal,
}

/// Aggregation variant: per category, the sum of all monthly budgets and
/// all one-time budgets whose stored month is exactly `month`.
///
/// Unlike the selection variant, a one-time budget with no month is not
/// counted here.
pub fn effective_budget_totals(
    rows: &[(Budget, Category)],
    month: &str,
) -> BTreeMap<i64, BudgetTotal> {
    let mut totals: BTreeMap<i64, BudgetTotal> = BTreeMap::new();

    for (budget, category) in rows {
        let counts = match budget.recurrence {
            Recurrence::Monthly => true,
            Recurrence::OneTime => budget.month.as_deref() == Some(month),
        };
        if !counts {
            continue;
        }
        totals
            .entry(category.id)
            .or_insert_with(|| BudgetTotal {
                category_name: category.name.clone(),
                amount: Decimal::ZERO,
            })
            .amount += budget.amount;
    }

    totals
}

/// Sum of every monthly budget, regardless of category.
pub fn recurring_total(rows: &[(Budget, Category)]) -> Decimal {
    rows.iter()
        .filter(|(b, _)| b.recurrence == Recurrence::Monthly)
        .map(|(b, _)| b.amount)
        .sum()
}

/// One-time budget amounts summed per normalized month.
pub fn one_time_totals_by_month(rows: &[(Budget, Category)]) -> BTreeMap<String, Decimal> {
    let mut out: BTreeMap<String, Decimal> = BTreeMap::new();
    for (budget, _) in rows {
        if budget.recurrence == Recurrence::Monthly {
            continue;
        }
        let Some(month) = normalize_month(budget.month.as_deref()) else {
            continue;
        };
        *out.entry(month).or_insert(Decimal::ZERO) += budget.amount;
    }
    out
}
