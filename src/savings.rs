//! Running savings across every month that has transaction activity.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

/// Income and expense totals for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthFlow {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavingsRow {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub budgeted: Decimal,
    pub savings: Decimal,
}

/// Projects the savings balance month by month.
///
/// The balance starts at zero. A seed for a month replaces the balance
/// before that month's net flow is applied. Seeds for months without any
/// transactions do not produce a row of their own.
pub fn project_savings(
    mut flows: Vec<MonthFlow>,
    recurring_total: Decimal,
    one_time_by_month: &BTreeMap<String, Decimal>,
    seeds: &BTreeMap<String, Decimal>,
) -> Vec<SavingsRow> {
    flows.sort_by(|a, b| a.month.cmp(&b.month));

    let mut running = Decimal::ZERO;
    flows
        .into_iter()
        .map(|flow| {
            if let Some(seed) = seeds.get(&flow.month) {
                running = *seed;
            }
            running += flow.income - flow.expenses;

            let one_time = one_time_by_month
                .get(&flow.month)
                .copied()
                .unwrap_or_default();

            SavingsRow {
                budgeted: round2(recurring_total + one_time),
                savings: round2(running),
                month: flow.month,
                income: flow.income,
                expenses: flow.expenses,
            }
        })
        .collect()
}

fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(month: &str, income: i64, expenses: i64) -> MonthFlow {
        MonthFlow {
            month: month.to_string(),
            income: Decimal::from(income),
            expenses: Decimal::from(expenses),
        }
    }

    fn savings(rows: &[SavingsRow]) -> Vec<Decimal> {
        rows.iter().map(|r| r.savings).collect()
    }

    #[test]
    fn seed_resets_running_balance() {
        let flows = vec![
            flow("2025-07", 1000, 800),
            flow("2025-08", 1000, 1200),
            flow("2025-09", 1000, 900),
        ];
        let seeds = BTreeMap::from([("2025-08".to_string(), Decimal::from(500))]);

        let rows = project_savings(flows, Decimal::ZERO, &BTreeMap::new(), &seeds);
        assert_eq!(
            savings(&rows),
            vec![Decimal::from(200), Decimal::from(300), Decimal::from(400)]
        );
    }

    #[test]
    fn balance_can_go_negative_without_seed() {
        let rows = project_savings(
            vec![flow("2025-01", 100, 300)],
            Decimal::ZERO,
            &BTreeMap::new(),
            &BTreeMap::new(),
        );
        assert_eq!(rows[0].savings, Decimal::from(-200));
    }

    #[test]
    fn seed_without_activity_is_not_a_row() {
        let seeds = BTreeMap::from([
            ("2025-02".to_string(), Decimal::from(5000)),
            ("2025-03".to_string(), Decimal::from(50)),
        ]);
        let rows = project_savings(
            vec![flow("2025-01", 10, 0), flow("2025-03", 10, 0)],
            Decimal::ZERO,
            &BTreeMap::new(),
            &seeds,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, "2025-01");
        assert_eq!(savings(&rows), vec![Decimal::from(10), Decimal::from(60)]);
    }

    #[test]
    fn budgeted_is_recurring_plus_matching_one_time() {
        let one_time = BTreeMap::from([("2025-08".to_string(), "49.99".parse().unwrap())]);
        let rows = project_savings(
            vec![flow("2025-08", 0, 0), flow("2025-07", 0, 0)],
            Decimal::from(300),
            &one_time,
            &BTreeMap::new(),
        );
        assert_eq!(rows[0].month, "2025-07");
        assert_eq!(rows[0].budgeted, Decimal::from(300));
        assert_eq!(rows[1].budgeted, "349.99".parse::<Decimal>().unwrap());
    }

    #[test]
    fn no_activity_means_no_rows() {
        let seeds = BTreeMap::from([("2025-08".to_string(), Decimal::from(500))]);
        let rows = project_savings(Vec::new(), Decimal::from(10), &BTreeMap::new(), &seeds);
        assert!(rows.is_empty());
    }
}
