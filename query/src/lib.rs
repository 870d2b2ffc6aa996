//! Tangle Query Execution
//!
//! This crate interprets validated query trees against a `Driver`:
//! - Lazy item sequences and a buffer-once replayable cursor (`seq`)
//! - The hierarchical result tree and its paths (`tree`)
//! - Leaf walking and materialization (`walk`)
//! - Sorted-set merge algebra and record merging (`algebra`)
//! - Filter predicate evaluation (`predicate`)
//! - Sequence transforms for the splicing operators (`operators`)
//! - The executor itself and a text-in, values-out engine facade

mod algebra;
mod config;
mod engine;
mod error;
mod executor;
mod operators;
mod predicate;
mod seq;
mod tree;
mod walk;

pub use algebra::{difference, intersect, merge_trees, merge_values, union};
pub use config::ExecutorConfig;
pub use engine::{Engine, EngineError, EngineResult};
pub use error::{QueryError, QueryResult};
pub use executor::{Executor, ParentCursor, EXISTS_FIELD, SCOPE_FIELD};
pub use operators::{reservoir_sample, Transform, COUNT_FIELD, GROUP_FIELD};
pub use predicate::FilterTest;
pub use seq::{ItemIter, Replay, ReplayIter, Seq};
pub use tree::{Key, Path, Step, Tree};
pub use walk::{is_leaf, Leaf};
