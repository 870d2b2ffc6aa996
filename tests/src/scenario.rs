//! Scenario definitions.
//!
//! A scenario names a schema, a driver and an ordered list of steps. Each
//! step is a query (from an operations source or given inline) paired with
//! an assertion on its output.

use tangle_analyzer::Schema;
use tangle_core::Driver;
use tangle_query::ExecutorConfig;

use crate::assertion::{Assertion, AssertionBuilder};
use crate::error::ExampleResult;
use crate::fixture;
use crate::loader::Operations;
use crate::runner::Runner;

/// One step of a scenario.
#[derive(Debug)]
pub struct Step {
    pub name: String,
    pub assertion: Assertion,
}

pub struct Scenario {
    pub name: String,
    schema: Schema,
    driver: Box<dyn Driver>,
    config: ExecutorConfig,
    operations: Operations,
    steps: Vec<Step>,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("operations", &self.operations)
            .field("steps", &self.steps)
            .finish()
    }
}

impl Scenario {
    /// A scenario over the default formula graph with the default schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Schema::default(),
            driver: Box::new(fixture::mock()),
            config: ExecutorConfig::new().with_seed(0),
            operations: Operations::default(),
            steps: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn driver(mut self, driver: impl Driver + 'static) -> Self {
        self.driver = Box::new(driver);
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Load step queries from an operations source.
    pub fn operations_source(mut self, source: &str) -> ExampleResult<Self> {
        let parsed = Operations::parse(source)?;
        for name in parsed.step_names() {
            if let Some(text) = parsed.get_step(name) {
                self.operations.insert(name, text);
            }
        }
        Ok(self)
    }

    /// Define one step's query inline.
    pub fn query(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.operations.insert(name, text);
        self
    }

    /// Add a step whose output is checked by the built assertion.
    pub fn step<F>(mut self, name: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        self.steps.push(Step {
            name: name.into(),
            assertion: build(AssertionBuilder::new()).build(),
        });
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    pub fn schema_ref(&self) -> &Schema {
        &self.schema
    }

    pub fn driver_ref(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn config_ref(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run every step in order, stopping at the first failed assertion.
    pub fn run(&self) -> ExampleResult<()> {
        Runner::new(self).run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_and_loaded_steps_share_one_namespace() {
        // GIVEN
        let source = ";;# hop\n(assoc friend (1))\n";

        // WHEN
        let scenario = Scenario::new("mixed")
            .operations_source(source)
            .unwrap()
            .query("ids", "(3 2 1)")
            .step("hop", |a| a.rows(3))
            .step("ids", |a| a.ids([3, 2, 1]));

        // THEN
        assert_eq!(scenario.steps().len(), 2);
        assert_eq!(scenario.operations().get_step("ids"), Some("(3 2 1)"));
        assert_eq!(scenario.operations().get_step("hop"), Some("(assoc friend (1))"));
    }
}
