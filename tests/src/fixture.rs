//! Shared schemas and drivers.

use tangle_analyzer::{FieldType, Schema, SchemaError};
use tangle_core::item;
use tangle_graph::{MemoryStore, MockConfig, MockDriver};

/// Schema of the people graph: integer ages, string names.
pub fn people_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .field("age", FieldType::Int)
        .field("name", FieldType::String)
        .build()
}

/// The default formula graph: three edges per object, ids `N*10 ..`.
pub fn mock() -> MockDriver {
    MockDriver::new(MockConfig::new().with_seed(7))
}

/// A small social graph held in an ordered store.
///
/// ```text
/// 1 ada    friend -> 2 (t=30), 3 (t=20), 4 (t=10)    likes -> 5
/// 2 bob    friend -> 1 (t=25), 4 (t=15)
/// 3 cy     friend -> 4 (t=40)
/// 4 dee    (no edges)
/// 5 eve    friend -> 1 (t=5)
/// ```
pub fn social() -> MemoryStore {
    let mut store = MemoryStore::new();
    let people = [(1, "ada", 31), (2, "bob", 17), (3, "cy", 24), (4, "dee", 16), (5, "eve", 45)];
    for (id, name, age) in people {
        store.insert_object(id, &item! { "name" => name, "age" => age });
    }
    store.add_assoc(1, "friend", 30, 2, "school");
    store.add_assoc(1, "friend", 20, 3, "work");
    store.add_assoc(1, "friend", 10, 4, "");
    store.add_assoc(1, "likes", 50, 5, "");
    store.add_assoc(2, "friend", 25, 1, "school");
    store.add_assoc(2, "friend", 15, 4, "");
    store.add_assoc(3, "friend", 40, 4, "club");
    store.add_assoc(5, "friend", 5, 1, "");
    store
}
