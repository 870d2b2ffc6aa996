//! Leaf walking and materialization of result trees.

use crate::seq::ItemIter;
use crate::tree::{Path, Step, Tree};
use tangle_core::{Item, Value};

/// True if no field of `item` holds identifier-bearing records.
///
/// Items that fail this test are interior: their list fields hold the next
/// level of the hierarchy.
pub fn is_leaf(item: &Item) -> bool {
    !item.fields().any(|(_, value)| holds_records(value))
}

fn holds_records(value: &Value) -> bool {
    match value {
        Value::List(values) => values
            .iter()
            .any(|v| v.as_record().map(Item::has_id).unwrap_or(false)),
        _ => false,
    }
}

/// A leaf item together with its address.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub path: Path,
    pub item: Item,
}

impl Tree {
    /// Depth-first leaves of the tree. Buffers every sequence.
    pub fn walk(&mut self) -> Vec<Leaf> {
        let mut out = Vec::new();
        walk_tree(self, &mut Vec::new(), &mut out);
        out
    }

    /// Lazily flatten the tree to its leaf items, discarding structure.
    pub fn into_leaves(self) -> ItemIter {
        match self {
            Tree::Map(entries) => Box::new(
                entries
                    .into_iter()
                    .flat_map(|(_, child)| child.into_leaves()),
            ),
            Tree::Seq(seq) => Box::new(seq.into_iter().flat_map(item_leaves)),
        }
    }

    /// Force the tree into a concrete value, pruning empty branches.
    ///
    /// Mappings become records keyed by entry name, sequences become lists.
    pub fn materialize(self, anonymous_key: &str) -> Value {
        match self {
            Tree::Map(entries) => {
                let mut record = Item::new();
                for (key, child) in entries {
                    let value = child.materialize(anonymous_key);
                    if !value.is_empty_container() {
                        record.set(key.render(anonymous_key), value);
                    }
                }
                Value::Record(record)
            }
            Tree::Seq(seq) => Value::List(
                seq.into_iter()
                    .map(|item| prune(Value::Record(item)))
                    .filter(|value| !value.is_empty_container())
                    .collect(),
            ),
        }
    }

    /// Leaf items as pruned records. Leaves that prune to nothing are dropped.
    pub fn flatten(self) -> Vec<Value> {
        self.into_leaves()
            .map(|item| prune(Value::Record(item)))
            .filter(|value| !value.is_empty_container())
            .collect()
    }
}

fn walk_tree(tree: &mut Tree, path: &mut Vec<Step>, out: &mut Vec<Leaf>) {
    match tree {
        Tree::Map(entries) => {
            for (i, (_, child)) in entries.iter_mut().enumerate() {
                path.push(Step::Entry(i));
                walk_tree(child, path, out);
                path.pop();
            }
        }
        Tree::Seq(seq) => {
            for (j, item) in seq.force().iter().enumerate() {
                path.push(Step::Item(j));
                walk_item(item, path, out);
                path.pop();
            }
        }
    }
}

fn walk_item(item: &Item, path: &mut Vec<Step>, out: &mut Vec<Leaf>) {
    if is_leaf(item) {
        out.push(Leaf {
            path: Path::from(path.clone()),
            item: item.clone(),
        });
        return;
    }
    for (name, value) in item.fields() {
        if !holds_records(value) {
            continue;
        }
        let Value::List(values) = value else { continue };
        for (k, element) in values.iter().enumerate() {
            if let Value::Record(inner) = element {
                path.push(Step::Field(name.to_string()));
                path.push(Step::Item(k));
                walk_item(inner, path, out);
                path.pop();
                path.pop();
            }
        }
    }
}

fn item_leaves(item: Item) -> ItemIter {
    if is_leaf(&item) {
        return Box::new(std::iter::once(item));
    }
    let nested: Vec<Item> = item
        .into_fields()
        .into_iter()
        .filter(|(_, value)| holds_records(value))
        .flat_map(|(_, value)| match value {
            Value::List(values) => values,
            _ => Vec::new(),
        })
        .filter_map(|value| match value {
            Value::Record(inner) => Some(inner),
            _ => None,
        })
        .collect();
    Box::new(nested.into_iter().flat_map(item_leaves))
}

/// Drop empty fields and list elements, bottom-up.
///
/// A record or list left with nothing in it is itself empty and is dropped
/// by its parent in turn. Scalars are kept whatever their value.
pub(crate) fn prune(value: Value) -> Value {
    match value {
        Value::List(values) => Value::List(
            values
                .into_iter()
                .map(prune)
                .filter(|v| !v.is_empty_container())
                .collect(),
        ),
        Value::Record(item) => Value::Record(
            item.into_fields()
                .into_iter()
                .map(|(name, v)| (name, prune(v)))
                .filter(|(_, v)| !v.is_empty_container())
                .collect(),
        ),
        other => other,
    }
}
