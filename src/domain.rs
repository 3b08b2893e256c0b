use chrono::NaiveDate;
use clap::ValueEnum;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TxnKind {
    Expense,
    Income,
}

impl TxnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TxnKind::Expense => "expense",
            TxnKind::Income => "income",
        }
    }
}

/// How often a budget applies.
///
/// Anything stored that is not `monthly` is read back as one-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[value(alias = "one_time")]
    OneTime,
    Monthly,
}

impl Recurrence {
    pub fn as_str(self) -> &'static str {
        match self {
            Recurrence::OneTime => "one_time",
            Recurrence::Monthly => "monthly",
        }
    }

    pub fn from_stored(raw: &str) -> Self {
        if raw == "monthly" {
            Recurrence::Monthly
        } else {
            Recurrence::OneTime
        }
    }
}

/// The authenticated user a request runs as. Passed explicitly into every
/// query that reads or writes user data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub kind: TxnKind,
    /// Always >= 0; the sign comes from `kind`.
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    /// `YYYY-MM`. Required for one-time budgets, kept but ignored for monthly ones.
    pub month: Option<String>,
    pub amount: Decimal,
    pub recurrence: Recurrence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavingsStart {
    pub id: i64,
    pub user_id: i64,
    pub month: String,
    pub amount: Decimal,
}

/// Fields of a transaction before it has an id.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub category_id: i64,
    pub kind: TxnKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Result of an insert-or-update keyed on a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted(i64),
    Updated(i64),
}

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_ICON: &str = "tag";

/// Icon tags a category may carry, with their human labels.
pub const ICONS: &[(&str, &str)] = &[
    ("tag", "Tag"),
    ("cart", "Shopping"),
    ("basket", "Groceries"),
    ("cash", "Cash"),
    ("credit-card", "Credit Card"),
    ("piggy-bank", "Savings"),
    ("dollar-sign", "Income"),
    ("wallet2", "Wallet"),
    ("house", "Housing"),
    ("building", "Rent/Mortgage"),
    ("car-front", "Car"),
    ("bus-front", "Public Transport"),
    ("bicycle", "Bike"),
    ("airplane", "Flights"),
    ("train-front", "Train"),
    ("fuel-pump", "Fuel"),
    ("bolt", "Utilities"),
    ("lightbulb", "Electricity"),
    ("droplet", "Water"),
    ("wifi", "Internet"),
    ("phone", "Phone"),
    ("tv", "Streaming/TV"),
    ("heart", "Health"),
    ("capsule", "Medicine"),
    ("hospital", "Hospital"),
    ("utensils", "Food"),
    ("cup-straw", "Coffee"),
    ("beer", "Drinks"),
    ("egg-fried", "Dining"),
    ("cake", "Dessert"),
    ("gift", "Gifts"),
    ("balloon", "Events"),
    ("gamepad", "Games"),
    ("controller", "Entertainment"),
    ("music-note", "Music"),
    ("film", "Movies"),
    ("book", "Books"),
    ("graduation-cap", "Education"),
    ("scissors", "Personal Care"),
    ("person", "Personal"),
    ("briefcase", "Work"),
    ("tools", "Repairs"),
    ("hammer", "Home Projects"),
    ("tree", "Outdoors"),
    ("sun", "Vacation"),
    ("snow", "Winter"),
    ("cloud-rain", "Rainy Day Fund"),
];

pub fn is_known_icon(icon: &str) -> bool {
    ICONS.iter().any(|(tag, _)| *tag == icon)
}

/// Amounts are persisted as integer cents; round half away from zero first.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    (amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero) * Decimal::ONE_HUNDRED)
        .to_i64()
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
