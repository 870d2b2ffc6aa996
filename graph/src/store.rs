//! Ordered in-memory store laid out like a key-value backend.
//!
//! Objects are JSON blobs keyed by identifier. Associations are keyed by
//! `(source, type, time, destination)` with time reversed, so one forward
//! range scan from `(source, type)` yields that pair's edges newest first.
//! Neighbouring pairs share the keyspace; the scan stops at the first key
//! that belongs to another pair.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use tangle_core::{edge, Driver, DriverError, DriverResult, Item, Value, ID_FIELD};

type AssocKey = (i64, String, Reverse<i64>, i64);

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: HashMap<i64, String>,
    assocs: BTreeMap<AssocKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object under `id`. The identifier field is added if missing.
    pub fn insert_object(&mut self, id: i64, item: &Item) {
        let mut item = item.clone();
        if !item.has_id() {
            item.set(ID_FIELD, id);
        }
        self.objects.insert(id, item.to_json().to_string());
    }

    /// Store an object blob as-is.
    pub fn insert_raw_object(&mut self, id: i64, blob: impl Into<String>) {
        self.objects.insert(id, blob.into());
    }

    pub fn add_assoc(
        &mut self,
        source: i64,
        assoc: impl Into<String>,
        time: i64,
        destination: i64,
        data: impl Into<String>,
    ) {
        self.assocs
            .insert((source, assoc.into(), Reverse(time), destination), data.into());
    }

    fn object(&self, id: &Value) -> DriverResult<Item> {
        let key = id.as_int().ok_or_else(|| DriverError::not_found(id))?;
        let blob = self
            .objects
            .get(&key)
            .ok_or_else(|| DriverError::not_found(key))?;
        let json: serde_json::Value = serde_json::from_str(blob)
            .map_err(|e| DriverError::corrupt(key.to_string(), e.to_string()))?;
        match Value::from_json(&json) {
            Value::Record(item) => Ok(item),
            other => Err(DriverError::corrupt(
                key.to_string(),
                format!("expected an object, found {}", other.type_name()),
            )),
        }
    }
}

impl Driver for MemoryStore {
    fn object_lookup(&self, ids: &[Value]) -> DriverResult<Vec<Item>> {
        ids.iter().map(|id| self.object(id)).collect()
    }

    fn association_lookup(&self, assoc: &str, id: &Value) -> DriverResult<Vec<Item>> {
        let source = id.as_int().ok_or_else(|| DriverError::not_found(id))?;
        let start: AssocKey = (source, assoc.to_string(), Reverse(i64::MAX), i64::MIN);

        let mut edges = Vec::new();
        for ((src, kind, Reverse(time), destination), data) in self.assocs.range(start..) {
            if *src != source || kind != assoc {
                break;
            }
            edges.push(edge(*destination, *time, data.as_str()));
        }
        tracing::trace!(assoc, source, count = edges.len(), "store association scan");
        Ok(edges)
    }
}
