use crate::domain::{Recurrence, TxnKind};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "budgetbook")]
#[command(about = "Personal budgets, net spend and savings analytics", long_about = None)]
pub struct Cli {
    /// Override budgetbook home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "BUDGETBOOK_HOME")]
    pub home: Option<std::path::PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD). Used for reproducible output.
    #[arg(long, env = "BUDGETBOOK_TODAY", hide = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    User(UserArgs),
    Category(CategoryArgs),
    Txn(TxnArgs),
    Budget(BudgetArgs),
    Savings(SavingsArgs),

    Dashboard(DashboardArgs),
    Analytics(AnalyticsArgs),
    /// Expense transactions in categories without a budget for the month.
    Unbudgeted(MonthArgs),
}

#[derive(Debug, Subcommand)]
pub enum UserCmd {
    /// Create an account (with a default "General" category).
    Register { email: String },
    Login { email: String },
    Logout,
    Whoami,
}

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub cmd: UserCmd,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCmd {
    Add {
        name: String,
        #[arg(long, default_value = "tag")]
        icon: String,
    },
    List,
    Edit {
        name: String,
        #[arg(long = "name")]
        new_name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    Delete {
        name: String,
    },
    /// Transactions of one category for a month.
    Show {
        name: String,
        #[arg(long)]
        month: Option<String>,
    },
    /// Icon tags a category can use.
    Icons,
}

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub cmd: CategoryCmd,
}

#[derive(Debug, Subcommand)]
pub enum TxnCmd {
    Add {
        #[arg(value_enum)]
        kind: TxnKind,
        category: String,
        amount: Decimal,
        /// Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, short = 'm', alias = "note")]
        description: Option<String>,
    },
    List,
    Edit {
        id: i64,
        #[arg(long, value_enum)]
        kind: Option<TxnKind>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, short = 'm', alias = "note")]
        description: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct TxnArgs {
    #[command(subcommand)]
    pub cmd: TxnCmd,
}

#[derive(Debug, Subcommand)]
pub enum BudgetCmd {
    /// Create a budget, or update the one for the same category and month.
    Set {
        category: String,
        amount: Decimal,
        /// Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        #[arg(long, value_enum, default_value = "one-time")]
        recurrence: Recurrence,
    },
    List,
    Edit {
        id: i64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long, value_enum)]
        recurrence: Option<Recurrence>,
        /// Only applied to one-time budgets.
        #[arg(long)]
        month: Option<String>,
    },
    Delete {
        id: i64,
    },
    /// Months offered when picking a budget month.
    Months,
}

#[derive(Debug, Args)]
pub struct BudgetArgs {
    #[command(subcommand)]
    pub cmd: BudgetCmd,
}

#[derive(Debug, Subcommand)]
pub enum SavingsCmd {
    /// Reset the running savings balance to AMOUNT at the start of MONTH.
    Set { month: String, amount: Decimal },
    List,
}

#[derive(Debug, Args)]
pub struct SavingsArgs {
    #[command(subcommand)]
    pub cmd: SavingsCmd,
}

#[derive(Debug, Args)]
pub struct MonthArgs {
    /// Defaults to the current month.
    #[arg(long)]
    pub month: Option<String>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub month: MonthArgs,

    /// Print the view as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    #[arg(long)]
    pub json: bool,
}
