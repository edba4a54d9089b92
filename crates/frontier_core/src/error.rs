use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a basket could not be turned into an aligned return history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsufficientDataCause {
    /// A series has fewer than two observations of its own
    SinglePointSeries { symbol: String, points: usize },
    /// The series do not share at least two dates
    NoOverlap { aligned_dates: usize },
}

impl fmt::Display for InsufficientDataCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientDataCause::SinglePointSeries { symbol, points } => {
                write!(f, "{symbol} has only {points} price observation(s)")
            }
            InsufficientDataCause::NoOverlap { aligned_dates } => {
                write!(
                    f,
                    "only {aligned_dates} date(s) are shared by every series in the basket"
                )
            }
        }
    }
}

/// Errors raised by an analysis run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontierError {
    #[error("no tickers requested")]
    EmptyBasket,

    #[error("insufficient data: {cause}")]
    InsufficientData { cause: InsufficientDataCause },

    #[error("simulation count {requested} is outside the allowed range [{min}, {max}]")]
    SimulationBoundsExceeded {
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error("invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    /// The run was cancelled through its progress handle
    #[error("simulation cancelled")]
    Cancelled,
}

impl FrontierError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn insufficient_data(cause: InsufficientDataCause) -> Self {
        Self::InsufficientData { cause }
    }
}

pub type Result<T> = std::result::Result<T, FrontierError>;
