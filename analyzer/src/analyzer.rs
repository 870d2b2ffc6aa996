//! Main analyzer implementation.

use crate::{
    AnalyzerError, AnalyzerResult, Binding, CompareOp, Dispatch, FieldType, Operator,
    OperatorSpec, Predicate, QueryNode, Schema, SortDirection, SortKey,
};
use tangle_core::{Value, ID_FIELD};
use tangle_parser::Sexp;

/// Validate `form` against `schema` and lower it into a query tree.
pub fn analyze(schema: &Schema, form: &Sexp) -> AnalyzerResult<QueryNode> {
    Analyzer::new(schema).analyze(form)
}

/// The Analyzer checks operator arities and operand shapes, and types
/// filter operands from the schema's field declarations.
pub struct Analyzer<'s> {
    schema: &'s Schema,
}

impl<'s> Analyzer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Analyze a form in query position.
    pub fn analyze(&self, form: &Sexp) -> AnalyzerResult<QueryNode> {
        match form {
            Sexp::Quote(inner) => Ok(QueryNode::Literal(literal_values(inner))),
            Sexp::List(items) => match self.schema.dispatch(form) {
                Dispatch::Operator(spec) => {
                    let args = form.args();
                    if !spec.accepts(args.len()) {
                        return Err(AnalyzerError::arity(
                            spec.name,
                            spec.arity(),
                            args.len(),
                            form,
                        ));
                    }
                    self.lower(&spec, form, args)
                }
                Dispatch::Literal => {
                    tracing::trace!(form = %form, "reading list as identifier literal");
                    Ok(QueryNode::Literal(items.iter().map(to_value).collect()))
                }
            },
            atom => Err(AnalyzerError::invalid_argument(
                "query",
                format!("expected a query form, found {}", kind(atom)),
                form,
            )),
        }
    }

    fn input(&self, form: &Sexp) -> AnalyzerResult<Box<QueryNode>> {
        self.analyze(form).map(Box::new)
    }

    fn inputs(&self, forms: &[Sexp]) -> AnalyzerResult<Vec<QueryNode>> {
        forms.iter().map(|f| self.analyze(f)).collect()
    }

    fn lower(&self, spec: &OperatorSpec, form: &Sexp, args: &[Sexp]) -> AnalyzerResult<QueryNode> {
        let op = spec.name;
        // Arity is already checked, so fixed positions below are in bounds.
        let last = || {
            args.last()
                .ok_or_else(|| AnalyzerError::arity(op, spec.arity(), 0, form))
        };
        let node = match spec.op {
            Operator::Limit => QueryNode::Limit {
                count: count(op, &args[0], form)?,
                offset: if args.len() == 3 {
                    count(op, &args[1], form)?
                } else {
                    0
                },
                input: self.input(last()?)?,
            },
            Operator::Random => QueryNode::Random {
                count: count(op, &args[0], form)?,
                input: self.input(last()?)?,
            },
            Operator::Reverse => QueryNode::Reverse {
                input: self.input(last()?)?,
            },
            Operator::Count => QueryNode::Count {
                input: self.input(last()?)?,
            },
            Operator::Aggregate => QueryNode::Aggregate {
                input: self.input(last()?)?,
            },
            Operator::Exists => QueryNode::Exists {
                input: self.input(last()?)?,
            },
            Operator::Filter => QueryNode::Filter {
                predicate: self.predicate(&args[0])?,
                input: self.input(last()?)?,
            },
            Operator::Project => QueryNode::Project {
                fields: field_list(op, &args[0], form)?,
                input: self.input(last()?)?,
            },
            Operator::OrderBy => QueryNode::OrderBy {
                keys: sort_keys(op, &args[0], form)?,
                input: self.input(last()?)?,
            },
            Operator::GroupBy => QueryNode::GroupBy {
                fields: field_list(op, &args[0], form)?,
                input: self.input(last()?)?,
            },
            Operator::And => QueryNode::And(self.inputs(args)?),
            Operator::Or => QueryNode::Or(self.inputs(args)?),
            Operator::IndexOr => QueryNode::IndexOr(self.inputs(args)?),
            Operator::Merge => QueryNode::Merge(self.inputs(args)?),
            Operator::Join => QueryNode::Join(self.inputs(args)?),
            Operator::Difference => QueryNode::Difference {
                left: self.input(&args[0])?,
                right: self.input(&args[1])?,
            },
            Operator::Nest => QueryNode::Nest {
                key: field_name(op, &args[0], form)?,
                input: self.input(last()?)?,
            },
            Operator::Let => QueryNode::Let {
                bindings: bindings(op, &args[0], form)?,
                input: self.input(last()?)?,
            },
            Operator::Target => QueryNode::Target {
                names: field_list(op, &args[0], form)?,
                input: self.input(last()?)?,
            },
            Operator::Apply => QueryNode::Apply {
                subquery: self.input(&args[0])?,
                input: self.input(&args[1])?,
            },
            Operator::Assoc => QueryNode::Assoc {
                assoc_type: field_name(op, &args[0], form)?,
                input: match args.get(1) {
                    Some(input) => Some(self.input(input)?),
                    None => None,
                },
            },
            Operator::Obj => QueryNode::Obj {
                input: match args {
                    [single] if !single.is_atom() => self.input(single)?,
                    ids => {
                        if let Some(bad) = ids.iter().find(|a| !a.is_atom()) {
                            return Err(AnalyzerError::invalid_argument(
                                op,
                                format!("expected identifiers or one query, found {}", bad),
                                form,
                            ));
                        }
                        Box::new(QueryNode::Literal(ids.iter().map(to_value).collect()))
                    }
                },
            },
            Operator::Literal => QueryNode::Literal(args.iter().map(to_value).collect()),
            Operator::JsonLiteral => {
                let text = args[0].as_name().ok_or_else(|| {
                    AnalyzerError::invalid_argument(op, "expected a JSON string", form)
                })?;
                let json = serde_json::from_str(text).map_err(|e| {
                    AnalyzerError::invalid_argument(op, format!("invalid JSON: {}", e), form)
                })?;
                QueryNode::JsonLiteral(json)
            }
        };
        Ok(node)
    }

    /// Lower a filter expression such as `(< age 18)` or `(inset :id (3 1))`.
    pub fn predicate(&self, form: &Sexp) -> AnalyzerResult<Predicate> {
        let Some(op) = form.head() else {
            return Err(AnalyzerError::invalid_argument(
                "filter",
                "expected a predicate form",
                form,
            ));
        };
        let args = form.args();
        if args.len() != 2 {
            return Err(AnalyzerError::arity(op, "2", args.len(), form));
        }
        let (target, operand) = (&args[0], &args[1]);

        if let Some(cmp) = CompareOp::from_symbol(op) {
            return match (target, operand) {
                (Sexp::List(fields), Sexp::List(operands)) => {
                    if fields.len() != operands.len() || fields.is_empty() {
                        return Err(AnalyzerError::invalid_argument(
                            op,
                            "tuple comparison needs as many operands as fields",
                            form,
                        ));
                    }
                    let fields = fields
                        .iter()
                        .map(|f| field_name(op, f, form))
                        .collect::<AnalyzerResult<Vec<_>>>()?;
                    let operands = fields
                        .iter()
                        .zip(operands)
                        .map(|(f, v)| self.operand(f, v, form))
                        .collect::<AnalyzerResult<Vec<_>>>()?;
                    Ok(Predicate::Compare {
                        op: cmp,
                        fields,
                        operands,
                    })
                }
                (Sexp::List(_), _) => Err(AnalyzerError::invalid_argument(
                    op,
                    "tuple comparison needs an operand list",
                    form,
                )),
                _ => {
                    let field = field_name(op, target, form)?;
                    let value = self.operand(&field, operand, form)?;
                    Ok(Predicate::compare(cmp, field, value))
                }
            };
        }

        let field = field_name(op, target, form)?;
        match op {
            "range" => match operand.as_list() {
                Some([hi, lo]) => Ok(Predicate::Range {
                    hi: self.operand(&field, hi, form)?,
                    lo: self.operand(&field, lo, form)?,
                    field,
                }),
                _ => Err(AnalyzerError::invalid_argument(
                    op,
                    "expected bounds (hi lo)",
                    form,
                )),
            },
            "inset" => {
                let members = match operand {
                    Sexp::List(members) => members.as_slice(),
                    single => std::slice::from_ref(single),
                };
                let values = members
                    .iter()
                    .map(|m| self.operand(&field, m, form))
                    .collect::<AnalyzerResult<Vec<_>>>()?;
                Ok(Predicate::InSet { field, values })
            }
            "contains" | "prefix" => {
                if let Some(declared) = self.schema.field_type(&field) {
                    if declared != FieldType::String {
                        return Err(AnalyzerError::operand_type(
                            &field,
                            FieldType::String.name(),
                            declared.name(),
                            form,
                        ));
                    }
                }
                let text = text(op, operand, form)?;
                Ok(if op == "contains" {
                    Predicate::Contains {
                        field,
                        needle: text,
                    }
                } else {
                    Predicate::Prefix {
                        field,
                        prefix: text,
                    }
                })
            }
            _ => Err(AnalyzerError::unknown_predicate(op, form)),
        }
    }

    /// Type a filter operand: declared fields coerce, undeclared fields keep
    /// the operand's lexical type.
    fn operand(&self, field: &str, operand: &Sexp, form: &Sexp) -> AnalyzerResult<Value> {
        let mismatch =
            |expected: FieldType| AnalyzerError::operand_type(field, expected.name(), kind(operand), form);
        match (self.schema.field_type(field), operand) {
            (_, Sexp::List(_) | Sexp::Quote(_)) => Err(AnalyzerError::invalid_argument(
                "filter",
                format!("expected a scalar operand for '{}'", field),
                form,
            )),
            (None, other) => Ok(to_value(other)),
            (Some(FieldType::Int), Sexp::Int(i)) => Ok(Value::Int(*i)),
            (Some(FieldType::Float), Sexp::Int(i)) => Ok(Value::Float(*i as f64)),
            (Some(FieldType::Float), Sexp::Float(f)) => Ok(Value::Float(*f)),
            (Some(FieldType::String), Sexp::Symbol(s) | Sexp::Str(s)) => {
                Ok(Value::String(s.clone()))
            }
            (Some(FieldType::Bool), Sexp::Symbol(s)) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(mismatch(FieldType::Bool)),
            },
            (Some(declared), _) => Err(mismatch(declared)),
        }
    }
}

fn kind(form: &Sexp) -> &'static str {
    match form {
        Sexp::List(_) => "list",
        Sexp::Symbol(_) => "symbol",
        Sexp::Str(_) => "string",
        Sexp::Int(_) | Sexp::Float(_) => "number",
        Sexp::Quote(_) => "quoted form",
    }
}

/// Lexical value of a literal element.
fn to_value(form: &Sexp) -> Value {
    match form {
        Sexp::Int(i) => Value::Int(*i),
        Sexp::Float(f) => Value::Float(*f),
        Sexp::Symbol(s) | Sexp::Str(s) => Value::String(s.clone()),
        Sexp::List(items) => Value::List(items.iter().map(to_value).collect()),
        Sexp::Quote(inner) => to_value(inner),
    }
}

fn literal_values(form: &Sexp) -> Vec<Value> {
    match form {
        Sexp::List(items) => items.iter().map(to_value).collect(),
        atom => vec![to_value(atom)],
    }
}

fn count(op: &str, arg: &Sexp, form: &Sexp) -> AnalyzerResult<usize> {
    match arg {
        Sexp::Int(n) if *n >= 0 => Ok(*n as usize),
        other => Err(AnalyzerError::invalid_argument(
            op,
            format!("expected a non-negative integer, found {}", other),
            form,
        )),
    }
}

fn field_name(op: &str, arg: &Sexp, form: &Sexp) -> AnalyzerResult<String> {
    match arg {
        Sexp::Symbol(s) | Sexp::Str(s) => Ok(s.clone()),
        // Association types are often numeric.
        Sexp::Int(i) => Ok(i.to_string()),
        other => Err(AnalyzerError::invalid_argument(
            op,
            format!("expected a name, found {}", other),
            form,
        )),
    }
}

fn text(op: &str, arg: &Sexp, form: &Sexp) -> AnalyzerResult<String> {
    match arg {
        Sexp::Symbol(s) | Sexp::Str(s) => Ok(s.clone()),
        Sexp::Int(i) => Ok(i.to_string()),
        Sexp::Float(f) => Ok(f.to_string()),
        other => Err(AnalyzerError::invalid_argument(
            op,
            format!("expected text, found {}", other),
            form,
        )),
    }
}

/// `name` or `(name ...)`.
fn field_list(op: &str, arg: &Sexp, form: &Sexp) -> AnalyzerResult<Vec<String>> {
    match arg {
        Sexp::List(items) if items.is_empty() => Err(AnalyzerError::invalid_argument(
            op,
            "expected at least one field",
            form,
        )),
        Sexp::List(items) => items.iter().map(|f| field_name(op, f, form)).collect(),
        single => Ok(vec![field_name(op, single, form)?]),
    }
}

/// `(a (b asc) (c desc))`; bare fields sort descending.
fn sort_keys(op: &str, arg: &Sexp, form: &Sexp) -> AnalyzerResult<Vec<SortKey>> {
    let items = match arg {
        Sexp::List(items) if !items.is_empty() => items.as_slice(),
        Sexp::List(_) => {
            return Err(AnalyzerError::invalid_argument(
                op,
                "expected at least one sort key",
                form,
            ))
        }
        single => std::slice::from_ref(single),
    };
    items
        .iter()
        .map(|key| match key {
            Sexp::List(pair) => match pair.as_slice() {
                [field, direction] => {
                    let keyword = direction.as_symbol().unwrap_or_default();
                    let direction = SortDirection::from_keyword(keyword)
                        .ok_or_else(|| AnalyzerError::unknown_direction(direction.to_string(), form))?;
                    Ok(SortKey {
                        field: field_name(op, field, form)?,
                        direction,
                    })
                }
                _ => Err(AnalyzerError::invalid_argument(
                    op,
                    "sort key must be field or (field direction)",
                    form,
                )),
            },
            field => Ok(SortKey::descending(field_name(op, field, form)?)),
        })
        .collect()
}

/// `((alias source) ...)`, at least one pair.
fn bindings(op: &str, arg: &Sexp, form: &Sexp) -> AnalyzerResult<Vec<Binding>> {
    let pairs = match arg {
        Sexp::List(pairs) if !pairs.is_empty() => pairs,
        _ => {
            return Err(AnalyzerError::invalid_argument(
                op,
                "expected a non-empty list of (alias source) pairs",
                form,
            ))
        }
    };
    pairs
        .iter()
        .map(|pair| match pair.as_list() {
            Some([alias, source]) => {
                let alias = field_name(op, alias, form)?;
                if alias == ID_FIELD {
                    return Err(AnalyzerError::reserved_field(alias, form));
                }
                Ok(Binding {
                    alias,
                    source: field_name(op, source, form)?,
                })
            }
            _ => Err(AnalyzerError::invalid_argument(
                op,
                format!("binding must be (alias source), found {}", pair),
                form,
            )),
        })
        .collect()
}
