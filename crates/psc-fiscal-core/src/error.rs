use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::Year;

#[derive(Debug, Error)]
pub enum PscError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid input: {field} must lie in [0, 1], got {value}")]
    FractionOutOfRange { field: String, value: Decimal },

    #[error("Length mismatch: {field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Year out of range: {field} = {year} is outside the project window [{start}, {end}]")]
    YearOutOfRange {
        field: String,
        year: Year,
        start: Year,
        end: Year,
    },

    #[error("Sunk cost reference year {year} is invalid: {reason}")]
    SunkCostReferenceYear { year: Year, reason: String },

    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: String, value: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PscError {
    fn from(e: serde_json::Error) -> Self {
        PscError::SerializationError(e.to_string())
    }
}

/// Reject a rate that must be a fraction.
pub(crate) fn check_fraction(field: &str, value: Decimal) -> Result<(), PscError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(PscError::FractionOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Reject a year outside `[start, end]`.
pub(crate) fn check_year(field: &str, year: Year, start: Year, end: Year) -> Result<(), PscError> {
    if year < start || year > end {
        return Err(PscError::YearOutOfRange {
            field: field.to_string(),
            year,
            start,
            end,
        });
    }
    Ok(())
}

/// Reject a per-year array whose length differs from the expected one.
pub(crate) fn check_len(field: &str, expected: usize, actual: usize) -> Result<(), PscError> {
    if expected != actual {
        return Err(PscError::LengthMismatch {
            field: field.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
