//! Items: ordered records with identifier-keyed identity.

use crate::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Reserved identifier field. Identity of an item is defined by this field alone.
pub const ID_FIELD: &str = ":id";

/// Reserved timestamp field carried by association edges.
pub const TIME_FIELD: &str = ":time";

/// Payload field carried by association edges.
pub const DATA_FIELD: &str = "data";

/// An ordered mapping from field name to value.
///
/// When both sides carry `:id`, equality, ordering and hashing look at that
/// field only. Otherwise equality is structural and ordering is undefined.
#[derive(Debug, Clone, Default)]
pub struct Item {
    fields: Vec<(String, Value)>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an item holding only an identifier.
    pub fn with_id(id: impl Into<Value>) -> Self {
        Self {
            fields: vec![(ID_FIELD.to_string(), id.into())],
        }
    }

    /// Build an item from a field list. A repeated name keeps its first value.
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut item = Item::new();
        for (name, value) in fields {
            let name = name.into();
            if !item.contains(&name) {
                item.fields.push((name, value));
            }
        }
        item
    }

    /// Interpret a value as an item.
    ///
    /// Records unwrap to themselves; anything else is taken to be an
    /// identifier, following the identifier-list convention of literals.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Record(item) => item,
            other => Item::with_id(other),
        }
    }

    /// The identifier, if this item carries one.
    pub fn id(&self) -> Option<&Value> {
        self.get(ID_FIELD)
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        if name == ID_FIELD {
            return None;
        }
        self.fields
            .iter_mut()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// Set a field, replacing an existing value in place or appending.
    ///
    /// The identifier is write-once: a write to an `:id` that is already
    /// present is ignored.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if name == ID_FIELD && self.has_id() {
            tracing::warn!(id = %value, "ignoring write to existing identifier");
            return;
        }
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Remove a non-identifier field.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        if name == ID_FIELD {
            return None;
        }
        let pos = self.fields.iter().position(|(field, _)| field == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Keep only the named fields, in the given order. Missing fields are skipped.
    pub fn project(&self, names: &[String]) -> Item {
        let fields = names
            .iter()
            .filter_map(|name| self.get(name).map(|v| (name.clone(), v.clone())))
            .collect();
        Item { fields }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => self.fields == other.fields,
        }
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.id() {
            Some(id) => id.hash(state),
            None => self.fields.hash(state),
        }
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => Some(a.cmp_sortable(b)),
            _ if self == other => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Item {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Item::from_fields(iter)
    }
}

/// Helper macro to build items.
#[macro_export]
macro_rules! item {
    () => {
        $crate::Item::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut item = $crate::Item::new();
            $(
                item.set($key, $crate::Value::from($value));
            )+
            item
        }
    };
}
