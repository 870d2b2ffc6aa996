//! Tangle Analyzer
//!
//! Validates parsed expressions against an explicit `Schema` and lowers
//! them into the typed `QueryNode` tree the executor consumes. Invalid
//! input is rejected here, so the executor may assume structural validity.

mod analyzer;
mod error;
mod schema;
mod types;

pub use analyzer::{analyze, Analyzer};
pub use error::{AnalyzerError, AnalyzerResult};
pub use schema::{Dispatch, FieldType, Operator, OperatorSpec, Schema, SchemaBuilder, SchemaError};
pub use types::*;
