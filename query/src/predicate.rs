//! Filter predicate evaluation.

use std::cmp::Ordering;
use std::rc::Rc;
use tangle_analyzer::{CompareOp, Predicate};
use tangle_core::{Item, Value};

/// A reusable boolean test over items, built once from a typed predicate.
///
/// A missing field, or a value that does not compare with the operand, makes
/// the test false for every operator.
#[derive(Debug, Clone)]
pub struct FilterTest {
    predicate: Rc<Predicate>,
}

impl FilterTest {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate: Rc::new(predicate),
        }
    }

    pub fn test(&self, item: &Item) -> bool {
        match self.predicate.as_ref() {
            Predicate::Compare {
                op,
                fields,
                operands,
            } => compare(item, *op, fields, operands),
            Predicate::Range { field, hi, lo } => item.get(field).is_some_and(|value| {
                matches!(value.compare(lo), Some(Ordering::Greater | Ordering::Equal))
                    && value.compare(hi) == Some(Ordering::Less)
            }),
            Predicate::InSet { field, values } => item.get(field).is_some_and(|value| {
                values
                    .iter()
                    .any(|candidate| value.compare(candidate) == Some(Ordering::Equal))
            }),
            Predicate::Contains { field, needle } => item
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.contains(needle.as_str())),
            Predicate::Prefix { field, prefix } => item
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.starts_with(prefix.as_str())),
        }
    }
}

fn compare(item: &Item, op: CompareOp, fields: &[String], operands: &[Value]) -> bool {
    let ordering = match (fields, operands) {
        ([field], [operand]) => item.get(field).and_then(|value| value.compare(operand)),
        _ => {
            let values: Option<Vec<Value>> =
                fields.iter().map(|field| item.get(field).cloned()).collect();
            values.and_then(|values| Value::List(values).compare(&Value::List(operands.to_vec())))
        }
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}
