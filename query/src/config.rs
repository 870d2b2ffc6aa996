//! Executor configuration.

/// Settings shared by an executor and the sub-executors it spawns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Seed for `random`. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// How the anonymous key of literal roots renders in hierarchical output.
    pub anonymous_key: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            anonymous_key: "_".to_string(),
        }
    }
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_anonymous_key(mut self, key: impl Into<String>) -> Self {
        self.anonymous_key = key.into();
        self
    }
}
