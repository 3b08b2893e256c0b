//! Plain-text and JSON output of view-models.

use crate::domain::{Budget, Category, ICONS, Recurrence, SavingsStart};
use crate::views::{AnalyticsView, CategoryMonthView, DashboardView, TransactionRow, UnbudgetedView};
use anyhow::Result;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if headers.is_empty() {
        println!("(no columns)");
        return;
    }

    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    fn print_row(cells: &[String], widths: &[usize]) {
        print!("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            print!(" {:width$} |", cell, width = *w);
        }
        println!();
    }

    fn print_sep(widths: &[usize]) {
        print!("|");
        for w in widths {
            print!("{}|", "-".repeat(w + 2));
        }
        println!();
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    print_row(&header_cells, &widths);
    print_sep(&widths);
    for row in rows {
        print_row(row, &widths);
    }
}

fn percent(p: f64) -> String {
    format!("{p:.0}%")
}

fn transaction_rows(txns: &[TransactionRow]) -> Vec<Vec<String>> {
    txns.iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.kind.as_str().to_string(),
                t.category.clone(),
                format!("{:.2}", t.amount),
                t.description.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

pub fn print_transactions(txns: &[TransactionRow]) {
    if txns.is_empty() {
        println!("(no transactions)");
        return;
    }
    print_table(
        &["ID", "DATE", "TYPE", "CATEGORY", "AMOUNT", "DESCRIPTION"],
        &transaction_rows(txns),
    );
}

pub fn print_dashboard(view: &DashboardView) {
    println!("month\t{}", view.month);
    println!();

    if view.cards.is_empty() {
        println!("(no budgets)");
    } else {
        let rows: Vec<Vec<String>> = view
            .cards
            .iter()
            .map(|c| {
                vec![
                    c.category_name.clone(),
                    format!("{:.2}", c.budget_amount),
                    format!("{:.2}", c.net_spent),
                    percent(c.percent),
                ]
            })
            .collect();
        print_table(&["CATEGORY", "BUDGET", "SPENT", "USED"], &rows);
    }

    println!();
    println!("unbudgeted\t{:.2}", view.unbudgeted_spent);
    let bar = &view.income_bar;
    println!(
        "income\t{:.2}\texpenses\t{:.2}\tused\t{}{}",
        bar.income,
        bar.expenses,
        percent(bar.percent),
        if bar.over { "\tOVER" } else { "" }
    );

    println!();
    println!("(recent transactions)");
    print_transactions(&view.recent_transactions);
}

pub fn print_analytics(view: &AnalyticsView) {
    if view.months.is_empty() {
        println!("(no transactions)");
        return;
    }
    let rows: Vec<Vec<String>> = (0..view.months.len())
        .map(|i| {
            vec![
                view.months[i].clone(),
                format!("{:.2}", view.income[i]),
                format!("{:.2}", view.expenses[i]),
                format!("{:.2}", view.budgeted[i]),
                format!("{:.2}", view.savings[i]),
            ]
        })
        .collect();
    print_table(&["MONTH", "INCOME", "EXPENSES", "BUDGETED", "SAVINGS"], &rows);
}

pub fn print_category_month(view: &CategoryMonthView) {
    println!("category\t{}\tmonth\t{}", view.category.name, view.month);
    print_transactions(&view.transactions);
    println!("expense\t{:.2}", view.total_expense);
    println!("income\t{:.2}", view.total_income);
}

pub fn print_unbudgeted(view: &UnbudgetedView) {
    println!("month\t{}", view.month);
    print_transactions(&view.transactions);
    println!("unbudgeted\t{:.2}", view.total);
}

pub fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("(no categories)");
        return;
    }
    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|c| vec![c.id.to_string(), c.name.clone(), c.icon.clone()])
        .collect();
    print_table(&["ID", "NAME", "ICON"], &rows);
}

pub fn print_icons() {
    for (tag, label) in ICONS {
        println!("{tag}\t{label}");
    }
}

/// Recurring budgets by category name, then one-time budgets newest month first.
pub fn print_budgets(rows: &[(Budget, Category)]) {
    if rows.is_empty() {
        println!("(no budgets)");
        return;
    }

    let mut recurring: Vec<&(Budget, Category)> = rows
        .iter()
        .filter(|(b, _)| b.recurrence == Recurrence::Monthly)
        .collect();
    recurring.sort_by(|a, b| a.1.name.cmp(&b.1.name));

    let mut one_time: Vec<&(Budget, Category)> = rows
        .iter()
        .filter(|(b, _)| b.recurrence == Recurrence::OneTime)
        .collect();
    one_time.sort_by(|a, b| b.0.month.cmp(&a.0.month).then_with(|| a.1.name.cmp(&b.1.name)));

    let to_row = |(b, c): &&(Budget, Category)| {
        vec![
            b.id.to_string(),
            c.name.clone(),
            b.month.clone().unwrap_or_default(),
            format!("{:.2}", b.amount),
        ]
    };

    println!("(recurring)");
    let table: Vec<Vec<String>> = recurring.iter().map(to_row).collect();
    print_table(&["ID", "CATEGORY", "MONTH", "AMOUNT"], &table);

    println!();
    println!("(one-time)");
    let table: Vec<Vec<String>> = one_time.iter().map(to_row).collect();
    print_table(&["ID", "CATEGORY", "MONTH", "AMOUNT"], &table);
}

pub fn print_savings_starts(seeds: &[SavingsStart]) {
    if seeds.is_empty() {
        println!("(no starting savings)");
        return;
    }
    for s in seeds {
        println!("{}\t{:.2}", s.month, s.amount);
    }
}
