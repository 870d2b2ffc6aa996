//! Query error types.

use tangle_core::DriverError;
use thiserror::Error;

/// Result type for query execution.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that abort query execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Propagated verbatim from the lookup boundary.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// An operator the grammar accepts but the executor does not implement.
    #[error("Unsupported operator: {op}")]
    Unsupported { op: String },

    /// Operands of `merge` that have no combinator.
    #[error("Cannot merge {left} with {right} at '{key}'")]
    MergeConflict {
        key: String,
        left: String,
        right: String,
    },
}

impl QueryError {
    pub fn unsupported(op: impl Into<String>) -> Self {
        Self::Unsupported { op: op.into() }
    }

    pub fn merge_conflict(
        key: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::MergeConflict {
            key: key.into(),
            left: left.into(),
            right: right.into(),
        }
    }
}
