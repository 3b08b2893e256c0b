use rust_decimal::Decimal;
use thiserror::Error;

/// Failures the user can recover from by changing the request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("Cannot delete: there are {0}.")]
    CategoryInUse(&'static str),

    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Another budget already exists for this category and month.")]
    DuplicateBudget,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Not logged in. Run: budgetbook user login <email>")]
    NotLoggedIn,

    #[error("Amount must not be negative (got {0})")]
    NegativeAmount(Decimal),

    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Decimal),

    #[error("Unknown icon '{0}'. Run: budgetbook category icons")]
    UnknownIcon(String),

    #[error("Invalid month '{0}'. Expected YYYY-MM")]
    InvalidMonth(String),
}
