//! The declarative schema queries are validated against.
//!
//! A `Schema` is built once, is immutable afterwards, and is passed by
//! reference into the analyzer. It carries the operator catalogue (names
//! and arities) and the declared types of item fields, which decide how
//! filter operands are typed.

use std::collections::HashMap;
use tangle_core::{ID_FIELD, TIME_FIELD};
use tangle_parser::Sexp;
use thiserror::Error;

/// Operator kinds known to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Limit,
    Random,
    Reverse,
    Count,
    Filter,
    Project,
    OrderBy,
    GroupBy,
    Aggregate,
    And,
    Or,
    IndexOr,
    Difference,
    Merge,
    Nest,
    Let,
    Target,
    Apply,
    Assoc,
    Obj,
    Literal,
    JsonLiteral,
    Exists,
    Join,
}

/// One catalogue entry: the spelling of an operator and its arity bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    pub op: Operator,
    pub name: &'static str,
    pub min_args: usize,
    /// `None` for variadic operators.
    pub max_args: Option<usize>,
}

impl OperatorSpec {
    pub const fn new(op: Operator, name: &'static str, min_args: usize, max_args: Option<usize>) -> Self {
        Self {
            op,
            name,
            min_args,
            max_args,
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Human-readable arity, e.g. `2..3` or `at least 1`.
    pub fn arity(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..{}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}

const CATALOGUE: &[OperatorSpec] = &[
    OperatorSpec::new(Operator::Limit, "limit", 2, Some(3)),
    OperatorSpec::new(Operator::Random, "random", 2, Some(2)),
    OperatorSpec::new(Operator::Reverse, "reverse", 1, Some(1)),
    OperatorSpec::new(Operator::Count, "count", 1, Some(1)),
    OperatorSpec::new(Operator::Filter, "filter", 2, Some(2)),
    OperatorSpec::new(Operator::Project, "project", 2, Some(2)),
    OperatorSpec::new(Operator::OrderBy, "orderby", 2, Some(2)),
    OperatorSpec::new(Operator::GroupBy, "groupby", 2, Some(2)),
    OperatorSpec::new(Operator::Aggregate, "aggregate", 1, Some(1)),
    OperatorSpec::new(Operator::And, "and", 1, None),
    OperatorSpec::new(Operator::Or, "or", 1, None),
    OperatorSpec::new(Operator::IndexOr, "index_or", 1, None),
    OperatorSpec::new(Operator::Difference, "difference", 2, Some(2)),
    OperatorSpec::new(Operator::Merge, "merge", 1, None),
    OperatorSpec::new(Operator::Nest, "nest", 2, Some(2)),
    OperatorSpec::new(Operator::Let, "let", 2, Some(2)),
    OperatorSpec::new(Operator::Target, "target", 2, Some(2)),
    OperatorSpec::new(Operator::Target, "targets", 2, Some(2)),
    OperatorSpec::new(Operator::Apply, "apply", 2, Some(2)),
    OperatorSpec::new(Operator::Assoc, "assoc", 1, Some(2)),
    OperatorSpec::new(Operator::Obj, "obj", 1, None),
    OperatorSpec::new(Operator::Literal, "literal", 0, None),
    OperatorSpec::new(Operator::JsonLiteral, "json_literal", 1, Some(1)),
    OperatorSpec::new(Operator::Exists, "exists", 1, Some(1)),
    OperatorSpec::new(Operator::Join, "join", 1, None),
];

/// How a list form is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The head names a catalogue operator.
    Operator(OperatorSpec),
    /// The head is not an operator name: the whole list, head included,
    /// is an identifier list.
    Literal,
}

/// Declared type of an item field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int,
    Float,
    String,
    Bool,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "Int",
            FieldType::Float => "Float",
            FieldType::String => "String",
            FieldType::Bool => "Bool",
        }
    }
}

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Field '{name}' declared twice")]
    DuplicateField { name: String },

    #[error("Reserved field '{name}' must be {expected}")]
    ReservedFieldType { name: String, expected: &'static str },
}

/// Immutable validation schema.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: HashMap<String, FieldType>,
    catalogue: &'static [OperatorSpec],
}

impl Default for Schema {
    fn default() -> Self {
        let mut fields = HashMap::new();
        fields.insert(ID_FIELD.to_string(), FieldType::Int);
        fields.insert(TIME_FIELD.to_string(), FieldType::Int);
        Self {
            fields,
            catalogue: CATALOGUE,
        }
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Declared type of a field, if any.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn operator(&self, name: &str) -> Option<&OperatorSpec> {
        self.catalogue.iter().find(|spec| spec.name == name)
    }

    pub fn operators(&self) -> impl Iterator<Item = &OperatorSpec> {
        self.catalogue.iter()
    }

    /// Decide how a list form is interpreted from its head.
    pub fn dispatch(&self, form: &Sexp) -> Dispatch {
        match form.head().and_then(|head| self.operator(head)) {
            Some(spec) => Dispatch::Operator(*spec),
            None => Dispatch::Literal,
        }
    }
}

/// Builder for constructing an immutable `Schema`.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldType)>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the type of a field.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push((name.into(), field_type));
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut schema = Schema::default();
        let mut declared = std::collections::HashSet::new();
        for (name, field_type) in self.fields {
            if !declared.insert(name.clone()) {
                return Err(SchemaError::DuplicateField { name });
            }
            if name == ID_FIELD || name == TIME_FIELD {
                if field_type != FieldType::Int {
                    return Err(SchemaError::ReservedFieldType {
                        name,
                        expected: FieldType::Int.name(),
                    });
                }
                continue;
            }
            schema.fields.insert(name, field_type);
        }
        Ok(schema)
    }
}
