//! Sequence transforms for the splicing operators.
//!
//! Each constructor returns a `Transform`: a pure function from one item
//! stream to another. The executor decides where in the tree it applies.

use crate::predicate::FilterTest;
use crate::seq::{defer, ItemIter};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::rc::Rc;
use tangle_analyzer::{Binding, SortDirection, SortKey};
use tangle_core::{Item, Value};

/// A reusable sequence-to-sequence function.
pub type Transform = Rc<dyn Fn(ItemIter) -> ItemIter>;

/// Field of the record produced by `count`.
pub const COUNT_FIELD: &str = "count";

/// Field holding the grouped items of a `groupby` record.
pub const GROUP_FIELD: &str = ":group";

/// Random source shared by an executor and every sub-executor it spawns.
#[derive(Clone)]
pub(crate) struct SharedRng(Rc<RefCell<StdRng>>);

impl SharedRng {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self(Rc::new(RefCell::new(rng)))
    }
}

impl RngCore for SharedRng {
    fn next_u32(&mut self) -> u32 {
        self.0.borrow_mut().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.borrow_mut().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.borrow_mut().fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.borrow_mut().try_fill_bytes(dest)
    }
}

/// Uniform sample of `count` elements without replacement (Algorithm R).
///
/// Single pass; holds at most `count` elements. Order of the sample is the
/// reservoir order, not the input order.
pub fn reservoir_sample<T, R: Rng + ?Sized>(
    input: impl Iterator<Item = T>,
    count: usize,
    rng: &mut R,
) -> Vec<T> {
    let mut reservoir = Vec::with_capacity(count);
    for (i, element) in input.enumerate() {
        if i < count {
            reservoir.push(element);
            continue;
        }
        let j = rng.gen_range(0..=i);
        if j < count {
            reservoir[j] = element;
        }
    }
    reservoir
}

pub(crate) fn limit(count: usize, offset: usize) -> Transform {
    Rc::new(move |items: ItemIter| -> ItemIter { Box::new(items.skip(offset).take(count)) })
}

pub(crate) fn random(count: usize, rng: SharedRng) -> Transform {
    Rc::new(move |items: ItemIter| -> ItemIter {
        let mut rng = rng.clone();
        Box::new(std::iter::once_with(move || reservoir_sample(items, count, &mut rng)).flatten())
    })
}

pub(crate) fn reverse() -> Transform {
    Rc::new(|items: ItemIter| {
        defer(items, |mut all| {
            all.reverse();
            all
        })
    })
}

pub(crate) fn count() -> Transform {
    Rc::new(|items: ItemIter| -> ItemIter {
        Box::new(
            std::iter::once_with(move || {
                Item::from_fields([(COUNT_FIELD, Value::from(items.count()))])
            }),
        )
    })
}

pub(crate) fn filter(test: FilterTest) -> Transform {
    Rc::new(move |items: ItemIter| -> ItemIter {
        let test = test.clone();
        Box::new(items.filter(move |item| test.test(item)))
    })
}

pub(crate) fn project(fields: Vec<String>) -> Transform {
    let fields: Rc<[String]> = fields.into();
    Rc::new(move |items: ItemIter| -> ItemIter {
        let fields = Rc::clone(&fields);
        Box::new(items.map(move |item| item.project(&fields)))
    })
}

/// Stable sort by the tuple of key fields. A missing field sorts as null.
pub(crate) fn orderby(keys: Vec<SortKey>) -> Transform {
    let keys: Rc<[SortKey]> = keys.into();
    Rc::new(move |items: ItemIter| {
        let keys = Rc::clone(&keys);
        defer(items, move |mut all| {
            all.sort_by(|a, b| compare_by(a, b, &keys));
            all
        })
    })
}

fn compare_by(a: &Item, b: &Item, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let left = a.get(&key.field).unwrap_or(&Value::Null);
        let right = b.get(&key.field).unwrap_or(&Value::Null);
        let ordering = match key.direction {
            SortDirection::Ascending => left.cmp_sortable(right),
            SortDirection::Descending => right.cmp_sortable(left),
        };
        if ordering.is_ne() {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Partition runs of consecutive items that agree on `fields`.
pub(crate) fn groupby(fields: Vec<String>) -> Transform {
    let fields: Rc<[String]> = fields.into();
    Rc::new(move |items: ItemIter| -> ItemIter {
        Box::new(GroupBy {
            input: items.peekable(),
            fields: Rc::clone(&fields),
        })
    })
}

struct GroupBy {
    input: Peekable<ItemIter>,
    fields: Rc<[String]>,
}

impl GroupBy {
    fn key_of(&self, item: &Item) -> Vec<Option<Value>> {
        self.fields.iter().map(|f| item.get(f).cloned()).collect()
    }
}

impl Iterator for GroupBy {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        let first = self.input.next()?;
        let key = self.key_of(&first);
        let mut group = vec![Value::Record(first)];
        loop {
            let fields = Rc::clone(&self.fields);
            let same = |item: &Item| {
                fields.iter().map(|f| item.get(f).cloned()).collect::<Vec<_>>() == key
            };
            match self.input.next_if(same) {
                Some(item) => group.push(Value::Record(item)),
                None => break,
            }
        }

        let mut record = Item::new();
        for (field, value) in self.fields.iter().zip(key) {
            if let Some(value) = value {
                record.set(field.as_str(), value);
            }
        }
        record.set(GROUP_FIELD, Value::List(group));
        Some(record)
    }
}

/// Copy each binding's source field into its alias, where present.
pub(crate) fn alias(bindings: Vec<Binding>) -> Transform {
    let bindings: Rc<[Binding]> = bindings.into();
    Rc::new(move |items: ItemIter| -> ItemIter {
        let bindings = Rc::clone(&bindings);
        Box::new(items.map(move |mut item| {
            for binding in bindings.iter() {
                if let Some(value) = item.get(&binding.source).cloned() {
                    item.set(binding.alias.as_str(), value);
                }
            }
            item
        }))
    })
}
