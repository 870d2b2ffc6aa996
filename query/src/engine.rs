//! Text-in, values-out facade over the whole pipeline.
//!
//! read → expand → validate → execute → materialize.

use crate::config::ExecutorConfig;
use crate::error::QueryError;
use crate::executor::Executor;
use tangle_analyzer::{analyze, AnalyzerError, QueryNode, Schema};
use tangle_core::{Driver, Value};
use tangle_parser::{parse, ParseError};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors from any stage of running a query text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed query text.
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),

    /// Well-formed text rejected by the schema.
    #[error("validation error: {0}")]
    Validation(#[from] AnalyzerError),

    /// Failure during execution.
    #[error("query error: {0}")]
    Query(#[from] QueryError),
}

/// Runs query texts against one schema and driver.
pub struct Engine<'a> {
    schema: &'a Schema,
    driver: &'a dyn Driver,
    config: ExecutorConfig,
}

impl<'a> Engine<'a> {
    pub fn new(schema: &'a Schema, driver: &'a dyn Driver, config: ExecutorConfig) -> Self {
        Self {
            schema,
            driver,
            config,
        }
    }

    /// Parse and validate without executing.
    pub fn prepare(&self, text: &str) -> EngineResult<QueryNode> {
        let form = parse(text)?;
        Ok(analyze(self.schema, &form)?)
    }

    /// Execute a prepared query and hand back the executor holding its tree.
    pub fn run(&self, node: &QueryNode) -> EngineResult<Executor<'a>> {
        let mut executor = Executor::new(self.driver, self.config.clone());
        executor.run(node)?;
        Ok(executor)
    }

    /// The leaf records of `text`'s result.
    pub fn flat(&self, text: &str) -> EngineResult<Vec<Value>> {
        let node = self.prepare(text)?;
        tracing::debug!(query = text, "running flat");
        Ok(self.run(&node)?.flat())
    }

    /// The full materialized tree of `text`'s result.
    pub fn hierarchical(&self, text: &str) -> EngineResult<Value> {
        let node = self.prepare(text)?;
        tracing::debug!(query = text, "running hierarchical");
        Ok(self.run(&node)?.hierarchical())
    }
}
