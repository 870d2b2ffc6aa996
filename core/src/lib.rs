//! Tangle Core Types
//!
//! This crate provides the foundational types shared by every stage of the
//! tangle query engine:
//! - Value types (the `Value` enum carried by item fields)
//! - Items (ordered records whose identity is keyed on the `:id` field)
//! - The driver capability (object and association lookup) and its errors
//! - JSON conversion for inline literals and rendered output

mod driver;
mod item;
mod json;
mod value;

pub use driver::*;
pub use item::*;
pub use value::*;
