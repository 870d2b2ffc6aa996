//! Sorted-set merge algebra and record merging.
//!
//! `intersect` and `union` walk their inputs in lockstep and assume every
//! input is sorted by descending identifier. Both are lazy.

use crate::error::{QueryError, QueryResult};
use crate::seq::{ItemIter, Seq};
use crate::tree::Tree;
use std::collections::HashSet;
use std::iter::Peekable;
use tangle_core::{Item, Value, ID_FIELD};

fn key(item: &Item) -> Value {
    item.id().cloned().unwrap_or(Value::Null)
}

/// N-way intersection by identifier. Emits the first input's item.
pub fn intersect(inputs: Vec<ItemIter>) -> ItemIter {
    Box::new(Intersect {
        inputs: inputs.into_iter().map(Iterator::peekable).collect(),
    })
}

/// N-way de-duplicated union by identifier, in descending order.
pub fn union(inputs: Vec<ItemIter>) -> ItemIter {
    Box::new(Union {
        inputs: inputs.into_iter().map(Iterator::peekable).collect(),
        last: None,
    })
}

/// Items of `left` absent from `right`, de-duplicated, in `left` order.
///
/// `right` is collected into a set on the first pull.
pub fn difference(left: ItemIter, right: ItemIter) -> ItemIter {
    let mut right = Some(right);
    let mut excluded: Option<HashSet<Item>> = None;
    let mut seen = HashSet::new();
    Box::new(left.filter(move |item| {
        let excluded = excluded
            .get_or_insert_with(|| right.take().map(|r| r.collect()).unwrap_or_default());
        !excluded.contains(item) && seen.insert(item.clone())
    }))
}

struct Intersect {
    inputs: Vec<Peekable<ItemIter>>,
}

impl Iterator for Intersect {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        if self.inputs.is_empty() {
            return None;
        }
        loop {
            let heads = self
                .inputs
                .iter_mut()
                .map(|input| input.peek().map(key))
                .collect::<Option<Vec<Value>>>()?;
            let lowest = heads.iter().min_by(|a, b| a.cmp_sortable(b))?.clone();

            if heads.iter().all(|head| head.cmp_sortable(&lowest).is_eq()) {
                let (first, rest) = self.inputs.split_first_mut()?;
                rest.iter_mut().for_each(|input| {
                    input.next();
                });
                return first.next();
            }
            for (input, head) in self.inputs.iter_mut().zip(&heads) {
                if head.cmp_sortable(&lowest).is_gt() {
                    input.next();
                }
            }
        }
    }
}

struct Union {
    inputs: Vec<Peekable<ItemIter>>,
    last: Option<Value>,
}

impl Iterator for Union {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        loop {
            let heads: Vec<Option<Value>> = self
                .inputs
                .iter_mut()
                .map(|input| input.peek().map(key))
                .collect();
            let (index, highest) = heads
                .iter()
                .enumerate()
                .filter_map(|(i, head)| head.as_ref().map(|h| (i, h)))
                .max_by(|a, b| a.1.cmp_sortable(b.1).then(b.0.cmp(&a.0)))?;
            let highest = highest.clone();

            let item = self.inputs[index].next()?;
            for (input, head) in self.inputs.iter_mut().zip(&heads) {
                if head.as_ref().is_some_and(|h| h.cmp_sortable(&highest).is_eq()) {
                    input.next_if(|candidate| key(candidate).cmp_sortable(&highest).is_eq());
                }
            }

            if self.last.as_ref().is_some_and(|last| last.cmp_sortable(&highest).is_eq()) {
                continue;
            }
            self.last = Some(highest);
            return Some(item);
        }
    }
}

/// Combine two result trees key-wise.
///
/// Mappings merge entry by entry. Two sequences that each hold a single
/// identifier-less record merge field by field; any other pair of sequences
/// concatenates.
pub fn merge_trees(left: Tree, right: Tree) -> QueryResult<Tree> {
    merge_at("", left, right)
}

fn merge_at(path: &str, left: Tree, right: Tree) -> QueryResult<Tree> {
    match (left, right) {
        (Tree::Map(mut entries), Tree::Map(other)) => {
            for (key, subtree) in other {
                match entries.iter().position(|(existing, _)| *existing == key) {
                    Some(pos) => {
                        let current = std::mem::take(&mut entries[pos].1);
                        entries[pos].1 = merge_at(&key.to_string(), current, subtree)?;
                    }
                    None => entries.push((key, subtree)),
                }
            }
            Ok(Tree::Map(entries))
        }
        (Tree::Seq(a), Tree::Seq(b)) => {
            let mut a = a.into_vec();
            let mut b = b.into_vec();
            if record_shaped(&a) && record_shaped(&b) {
                let merged = merge_items(a.remove(0), b.remove(0))?;
                return Ok(Tree::Seq(Seq::buffered(vec![merged])));
            }
            a.append(&mut b);
            Ok(Tree::Seq(Seq::buffered(a)))
        }
        (left, right) => Err(QueryError::merge_conflict(path, shape(&left), shape(&right))),
    }
}

fn record_shaped(items: &[Item]) -> bool {
    matches!(items, [only] if !only.has_id())
}

fn shape(tree: &Tree) -> &'static str {
    match tree {
        Tree::Seq(_) => "sequence",
        Tree::Map(_) => "mapping",
    }
}

fn merge_items(left: Item, right: Item) -> QueryResult<Item> {
    let mut merged = left;
    for (name, value) in right.into_fields() {
        if name == ID_FIELD && merged.has_id() {
            continue;
        }
        let combined = match merged.get(&name) {
            Some(existing) => merge_values(&name, existing.clone(), value)?,
            None => value,
        };
        merged.set(name, combined);
    }
    Ok(merged)
}

/// Combine two values of the same field.
///
/// Integers add, mixed numbers add as floats, strings and lists concatenate,
/// records merge recursively, booleans or together, and null yields to the
/// other side. Anything else is a conflict.
pub fn merge_values(field: &str, left: Value, right: Value) -> QueryResult<Value> {
    match (left, right) {
        (Value::Null, other) | (other, Value::Null) => Ok(other),
        (Value::Int(a), Value::Int(b)) => Ok(a
            .checked_add(b)
            .map(Value::Int)
            .unwrap_or(Value::Float(a as f64 + b as f64))),
        (a, b) if a.is_numeric() && b.is_numeric() => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => Ok(Value::Float(x + y)),
            _ => Err(QueryError::merge_conflict(field, a.type_name(), b.type_name())),
        },
        (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (Value::Record(a), Value::Record(b)) => merge_items(a, b).map(Value::Record),
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
        (a, b) => Err(QueryError::merge_conflict(field, a.type_name(), b.type_name())),
    }
}
