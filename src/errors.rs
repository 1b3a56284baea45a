//! Errors the analysis engine can return.
//!
//! - [`InvalidRecord`] when a transaction breaks a record invariant (a date
//!     without a `YYYY-MM` prefix, a negative amount).
//! - [`AmountOverflow`] when a running total no longer fits in a decimal.
//!
//! An empty record set is not an error, see [`Report::NoData`].
//!
//!  [`InvalidRecord`]: EngineError::InvalidRecord
//!  [`AmountOverflow`]: EngineError::AmountOverflow
//!  [`Report::NoData`]: crate::types::Report::NoData
use thiserror::Error;

use crate::types::TxId;

/// Engine errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid transaction `{id}`: {reason}")]
    InvalidRecord { id: TxId, reason: String },
    #[error("amount overflow while computing {0}")]
    AmountOverflow(&'static str),
}
