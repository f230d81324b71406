use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during a tax calculation.
///
/// Negative revenue or payroll is not detected here; callers sanitize their
/// inputs before invoking a calculator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// A bracket table was queried but has no brackets.
    #[error("bracket table '{0}' has no brackets")]
    EmptyTable(String),

    /// A table the calculation needs is absent from the table set.
    #[error("table '{0}' not found in the table set")]
    MissingTable(String),

    /// A rate parameter is outside `[0, 1]`.
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidRate { name: &'static str, value: Decimal },

    /// The IRPJ surcharge threshold is negative.
    #[error("surcharge threshold must be non-negative, got {0}")]
    InvalidThreshold(Decimal),
}
