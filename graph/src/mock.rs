//! A synthetic graph computed from a formula.
//!
//! Object `N` is `{":id": N, "name": "idN", "age": A}`. Its associations of
//! any type are the `fanout` objects `N*stride .. N*stride+fanout`, newest
//! first. Ages are drawn from a fixed set with a seeded generator.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::RefCell;
use tangle_core::{Driver, DriverError, DriverResult, Item, Value, TIME_FIELD};

/// Shape of the synthetic graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub fanout: i64,
    pub stride: i64,
    pub ages: Vec<i64>,
    pub seed: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fanout: 3,
            stride: 10,
            ages: vec![16, 17, 18],
            seed: 0,
        }
    }
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fanout(mut self, fanout: i64) -> Self {
        self.fanout = fanout;
        self
    }

    pub fn with_stride(mut self, stride: i64) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_ages(mut self, ages: Vec<i64>) -> Self {
        self.ages = ages;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Driver over the formula graph.
#[derive(Debug)]
pub struct MockDriver {
    config: MockConfig,
    rng: RefCell<StdRng>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl MockDriver {
    pub fn new(config: MockConfig) -> Self {
        let rng = RefCell::new(StdRng::seed_from_u64(config.seed));
        Self { config, rng }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    fn age(&self) -> Value {
        let mut rng = self.rng.borrow_mut();
        self.config
            .ages
            .choose(&mut *rng)
            .map(|age| Value::Int(*age))
            .unwrap_or(Value::Null)
    }

    fn object(&self, id: i64) -> Item {
        let mut item = Item::with_id(id);
        item.set("name", format!("id{}", id));
        item.set("age", self.age());
        item
    }
}

fn int_id(id: &Value) -> DriverResult<i64> {
    id.as_int().ok_or_else(|| DriverError::not_found(id))
}

impl Driver for MockDriver {
    fn object_lookup(&self, ids: &[Value]) -> DriverResult<Vec<Item>> {
        ids.iter()
            .map(|id| int_id(id).map(|n| self.object(n)))
            .collect()
    }

    fn association_lookup(&self, assoc: &str, id: &Value) -> DriverResult<Vec<Item>> {
        let source = int_id(id)?;
        tracing::trace!(assoc, source, "mock association lookup");
        let first = source * self.config.stride;
        Ok((0..self.config.fanout)
            .map(|k| {
                let mut edge = Item::with_id(first + k);
                edge.set(TIME_FIELD, self.config.fanout - k);
                edge.set("name", format!("id{}", first + k));
                edge.set("age", self.age());
                edge
            })
            .collect())
    }
}
