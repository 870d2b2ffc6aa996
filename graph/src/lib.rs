//! Tangle Graph Drivers
//!
//! Concrete implementations of the `Driver` capability:
//! - `MockDriver`: a synthetic graph computed from a formula, for tests
//! - `MemoryStore`: objects and time-ordered associations in ordered maps,
//!   laid out the way a key-value backend would store them

mod mock;
mod store;

pub use mock::{MockConfig, MockDriver};
pub use store::MemoryStore;
