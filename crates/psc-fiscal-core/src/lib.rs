pub mod cashflow;
pub mod contracts;
pub mod costs;
pub mod error;
pub mod indicators;
pub mod lifting;
pub mod summary;
pub mod timeseries;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::PscError;
pub use types::*;

/// Standard result type for all PSC engine operations
pub type PscResult<T> = Result<T, PscError>;
