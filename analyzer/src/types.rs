//! The typed query tree produced by the analyzer.

use tangle_core::Value;

/// A validated query: one variant per catalogue operator.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Skip `offset`, then take `count`.
    Limit {
        count: usize,
        offset: usize,
        input: Box<QueryNode>,
    },
    /// Uniform sample of `count` items.
    Random { count: usize, input: Box<QueryNode> },
    Reverse { input: Box<QueryNode> },
    Count { input: Box<QueryNode> },
    Filter {
        predicate: Predicate,
        input: Box<QueryNode>,
    },
    Project {
        fields: Vec<String>,
        input: Box<QueryNode>,
    },
    OrderBy {
        keys: Vec<SortKey>,
        input: Box<QueryNode>,
    },
    /// Partition consecutive items sharing the values of `fields`.
    GroupBy {
        fields: Vec<String>,
        input: Box<QueryNode>,
    },
    Aggregate { input: Box<QueryNode> },
    And(Vec<QueryNode>),
    Or(Vec<QueryNode>),
    IndexOr(Vec<QueryNode>),
    Difference {
        left: Box<QueryNode>,
        right: Box<QueryNode>,
    },
    Merge(Vec<QueryNode>),
    Nest { key: String, input: Box<QueryNode> },
    Let {
        bindings: Vec<Binding>,
        input: Box<QueryNode>,
    },
    Target {
        names: Vec<String>,
        input: Box<QueryNode>,
    },
    /// Run `subquery` against the current leaves and graft its results back.
    Apply {
        subquery: Box<QueryNode>,
        input: Box<QueryNode>,
    },
    /// Attach edges of `assoc_type` to every leaf; without input the
    /// executor's current tree is used.
    Assoc {
        assoc_type: String,
        input: Option<Box<QueryNode>>,
    },
    Obj { input: Box<QueryNode> },
    /// Identifier list (or explicit values) seeding the tree.
    Literal(Vec<Value>),
    JsonLiteral(serde_json::Value),
    Exists { input: Box<QueryNode> },
    /// Accepted by the grammar, rejected at execution.
    Join(Vec<QueryNode>),
}

impl QueryNode {
    /// Operator tag, for logging and error context.
    pub fn tag(&self) -> &'static str {
        match self {
            QueryNode::Limit { .. } => "limit",
            QueryNode::Random { .. } => "random",
            QueryNode::Reverse { .. } => "reverse",
            QueryNode::Count { .. } => "count",
            QueryNode::Filter { .. } => "filter",
            QueryNode::Project { .. } => "project",
            QueryNode::OrderBy { .. } => "orderby",
            QueryNode::GroupBy { .. } => "groupby",
            QueryNode::Aggregate { .. } => "aggregate",
            QueryNode::And(_) => "and",
            QueryNode::Or(_) => "or",
            QueryNode::IndexOr(_) => "index_or",
            QueryNode::Difference { .. } => "difference",
            QueryNode::Merge(_) => "merge",
            QueryNode::Nest { .. } => "nest",
            QueryNode::Let { .. } => "let",
            QueryNode::Target { .. } => "target",
            QueryNode::Apply { .. } => "apply",
            QueryNode::Assoc { .. } => "assoc",
            QueryNode::Obj { .. } => "obj",
            QueryNode::Literal(_) => "literal",
            QueryNode::JsonLiteral(_) => "json_literal",
            QueryNode::Exists { .. } => "exists",
            QueryNode::Join(_) => "join",
        }
    }

    /// Shorthand for an identifier-list literal.
    pub fn ids<I, V>(ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        QueryNode::Literal(ids.into_iter().map(Into::into).collect())
    }
}

/// Sort direction of one `orderby` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }
}

/// `let` alias: copy `source` into `alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub alias: String,
    pub source: String,
}

/// Comparison operators of filter predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Typed filter expression, evaluated directly against an item.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Compare the tuple of `fields` against `operands`, lexicographically.
    /// Both vectors have the same length.
    Compare {
        op: CompareOp,
        fields: Vec<String>,
        operands: Vec<Value>,
    },
    /// Half-open interval `lo <= item[field] < hi`.
    Range { field: String, hi: Value, lo: Value },
    InSet { field: String, values: Vec<Value> },
    Contains { field: String, needle: String },
    Prefix { field: String, prefix: String },
}

impl Predicate {
    /// Single-field comparison.
    pub fn compare(op: CompareOp, field: impl Into<String>, operand: impl Into<Value>) -> Self {
        Predicate::Compare {
            op,
            fields: vec![field.into()],
            operands: vec![operand.into()],
        }
    }
}
