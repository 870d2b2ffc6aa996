//! Analyzer error types.

use tangle_parser::Sexp;
use thiserror::Error;

/// A query that is well-formed text but invalid against the schema.
///
/// Every variant carries the offending node rendered back to text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzerError {
    /// Wrong number of operands for an operator.
    #[error("'{op}' expects {expected} arguments, got {actual} in {node}")]
    Arity {
        op: String,
        expected: String,
        actual: usize,
        node: String,
    },

    /// An operand of the wrong shape.
    #[error("Invalid argument to '{op}': {message} in {node}")]
    InvalidArgument {
        op: String,
        message: String,
        node: String,
    },

    /// Sort direction outside the `asc`/`desc` enumeration.
    #[error("Unknown sort direction '{direction}' in {node}")]
    UnknownDirection { direction: String, node: String },

    /// Filter operator outside the predicate catalogue.
    #[error("Unknown filter operator '{op}' in {node}")]
    UnknownPredicate { op: String, node: String },

    /// A filter operand that cannot take the declared type of its field.
    #[error("Operand for field '{field}' must be {expected}, got {actual} in {node}")]
    OperandType {
        field: String,
        expected: String,
        actual: String,
        node: String,
    },

    /// An attempt to assign a reserved field.
    #[error("Field '{field}' is reserved and cannot be assigned in {node}")]
    ReservedField { field: String, node: String },
}

impl AnalyzerError {
    pub fn arity(op: impl Into<String>, expected: impl Into<String>, actual: usize, node: &Sexp) -> Self {
        Self::Arity {
            op: op.into(),
            expected: expected.into(),
            actual,
            node: node.to_string(),
        }
    }

    pub fn invalid_argument(op: impl Into<String>, message: impl Into<String>, node: &Sexp) -> Self {
        Self::InvalidArgument {
            op: op.into(),
            message: message.into(),
            node: node.to_string(),
        }
    }

    pub fn unknown_direction(direction: impl Into<String>, node: &Sexp) -> Self {
        Self::UnknownDirection {
            direction: direction.into(),
            node: node.to_string(),
        }
    }

    pub fn unknown_predicate(op: impl Into<String>, node: &Sexp) -> Self {
        Self::UnknownPredicate {
            op: op.into(),
            node: node.to_string(),
        }
    }

    pub fn operand_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        node: &Sexp,
    ) -> Self {
        Self::OperandType {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
            node: node.to_string(),
        }
    }

    pub fn reserved_field(field: impl Into<String>, node: &Sexp) -> Self {
        Self::ReservedField {
            field: field.into(),
            node: node.to_string(),
        }
    }
}

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
