//! Errors raised while loading or running a scenario.

use thiserror::Error;

/// Result type for scenario operations.
pub type ExampleResult<T> = Result<T, ExampleError>;

#[derive(Debug, Error)]
pub enum ExampleError {
    #[error("Failed to parse operations in {source_name}: {message}")]
    OperationsParse {
        source_name: String,
        message: String,
    },

    #[error("Step '{step}' has no query")]
    StepNotFound { step: String },

    #[error("Step '{step}' failed: {message}")]
    AssertionFailed { step: String, message: String },

    #[error("Scenario setup failed: {message}")]
    Setup { message: String },
}

impl ExampleError {
    pub fn operations_parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OperationsParse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn step_not_found(step: impl Into<String>) -> Self {
        Self::StepNotFound { step: step.into() }
    }

    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }
}
