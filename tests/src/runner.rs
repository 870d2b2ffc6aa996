//! Scenario runner.

use tangle_query::{Engine, EngineResult};

use crate::assertion::StepOutput;
use crate::error::{ExampleError, ExampleResult};
use crate::scenario::Scenario;

/// Runs a scenario's steps against its driver.
pub struct Runner<'s> {
    scenario: &'s Scenario,
}

impl<'s> Runner<'s> {
    pub fn new(scenario: &'s Scenario) -> Self {
        Self { scenario }
    }

    pub fn run(&self) -> ExampleResult<()> {
        let engine = Engine::new(
            self.scenario.schema_ref(),
            self.scenario.driver_ref(),
            self.scenario.config_ref().clone(),
        );

        for step in self.scenario.steps() {
            let text = self
                .scenario
                .operations()
                .get_step(&step.name)
                .ok_or_else(|| ExampleError::step_not_found(&step.name))?;

            let result = execute(&engine, text).map_err(|e| e.to_string());
            step.assertion.verify(&step.name, &result)?;
        }
        Ok(())
    }
}

/// Execute `text` once per output mode. Both runs see the same seed.
fn execute(engine: &Engine<'_>, text: &str) -> EngineResult<StepOutput> {
    let node = engine.prepare(text)?;
    let rows = engine.run(&node)?.flat();
    let tree = engine.run(&node)?.hierarchical();
    Ok(StepOutput { rows, tree })
}

#[cfg(test)]
mod tests {
    use crate::scenario::Scenario;

    #[test]
    fn test_missing_step_query_is_reported() {
        let scenario = Scenario::new("missing").step("nowhere", |a| a.empty());
        let err = scenario.run().unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_runs_inline_steps() {
        let scenario = Scenario::new("inline")
            .query("limit", "(limit 3 (6 5 4 3 2 1))")
            .step("limit", |a| a.ids([6, 5, 4]));
        scenario.run().unwrap();
    }
}
