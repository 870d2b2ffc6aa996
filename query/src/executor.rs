//! The query executor.
//!
//! An `Executor` interprets a validated `QueryNode` tree against a `Driver`,
//! building a lazy result tree. Sequence transforms are spliced in above the
//! leaves they act on: at every top-level sequence when the executor has no
//! parent cursor, and inside every attached branch when it does.

use crate::algebra::{difference, intersect, merge_trees, union};
use crate::config::ExecutorConfig;
use crate::error::{QueryError, QueryResult};
use crate::operators::{self, SharedRng, Transform};
use crate::predicate::FilterTest;
use crate::seq::{ItemIter, Replay, Seq};
use crate::tree::{Key, Path, Step, Tree};
use crate::walk::Leaf;
use serde_json::{Map, Value as Json};
use std::collections::{HashMap, VecDeque};
use tangle_analyzer::QueryNode;
use tangle_core::{Driver, Item, Value};

/// Field set on the sentinel record produced by `exists`.
pub const EXISTS_FIELD: &str = "exists";

/// Field of the `exists` sentinel listing the identifiers in scope.
pub const SCOPE_FIELD: &str = ":scope";

/// Where the next transform applies: the `key` field of each item at `points`.
#[derive(Debug, Clone)]
pub struct ParentCursor {
    pub points: Replay<Path>,
    pub key: String,
}

impl ParentCursor {
    pub fn new(points: Vec<Path>, key: impl Into<String>) -> Self {
        Self {
            points: Replay::from_vec(points),
            key: key.into(),
        }
    }

    pub fn paths(&self) -> Vec<Path> {
        self.points.to_vec()
    }
}

/// Interpreter for one query. Owns the tree it builds.
pub struct Executor<'d> {
    driver: &'d dyn Driver,
    config: ExecutorConfig,
    rng: SharedRng,
    root: Tree,
    cursor: Option<ParentCursor>,
    scope: Option<Vec<Item>>,
    target: Option<Vec<String>>,
}

impl<'d> Executor<'d> {
    pub fn new(driver: &'d dyn Driver, config: ExecutorConfig) -> Self {
        let rng = SharedRng::new(config.seed);
        Self {
            driver,
            config,
            rng,
            root: Tree::default(),
            cursor: None,
            scope: None,
            target: None,
        }
    }

    /// An executor whose top level is `items`, as for a sub-traversal.
    pub fn scoped(driver: &'d dyn Driver, config: ExecutorConfig, items: Vec<Item>) -> Self {
        let mut executor = Self::new(driver, config);
        executor.root = Tree::items(items.clone());
        executor.scope = Some(items);
        executor
    }

    fn child(&self, scope: Option<Vec<Item>>) -> Executor<'d> {
        Executor {
            driver: self.driver,
            config: self.config.clone(),
            rng: self.rng.clone(),
            root: scope.clone().map(Tree::items).unwrap_or_default(),
            cursor: None,
            scope,
            target: None,
        }
    }

    /// Execute `node`, extending the current tree.
    pub fn run(&mut self, node: &QueryNode) -> QueryResult<()> {
        self.visit(node)
    }

    pub fn tree(&self) -> &Tree {
        &self.root
    }

    pub fn into_tree(self) -> Tree {
        self.root
    }

    pub fn cursor(&self) -> Option<&ParentCursor> {
        self.cursor.as_ref()
    }

    /// Destination recorded by `target`, if any.
    pub fn target(&self) -> Option<&[String]> {
        self.target.as_deref()
    }

    pub fn into_leaves(self) -> ItemIter {
        self.root.into_leaves()
    }

    /// Leaf items as records, with empty branches pruned.
    pub fn flat(self) -> Vec<Value> {
        self.root.flatten()
    }

    /// The whole tree, materialized and pruned.
    pub fn hierarchical(self) -> Value {
        self.root.materialize(&self.config.anonymous_key)
    }

    fn visit(&mut self, node: &QueryNode) -> QueryResult<()> {
        tracing::debug!(op = node.tag(), "visit");
        match node {
            QueryNode::Limit {
                count,
                offset,
                input,
            } => self.splice(input, operators::limit(*count, *offset)),
            QueryNode::Random { count, input } => {
                let transform = operators::random(*count, self.rng.clone());
                self.splice(input, transform)
            }
            QueryNode::Reverse { input } => self.splice(input, operators::reverse()),
            QueryNode::Count { input } => self.splice(input, operators::count()),
            QueryNode::Filter { predicate, input } => {
                let test = FilterTest::new(predicate.clone());
                self.splice(input, operators::filter(test))
            }
            QueryNode::Project { fields, input } => {
                self.splice(input, operators::project(fields.clone()))
            }
            QueryNode::OrderBy { keys, input } => {
                self.splice(input, operators::orderby(keys.clone()))
            }
            QueryNode::GroupBy { fields, input } => {
                self.splice(input, operators::groupby(fields.clone()))
            }
            QueryNode::Let { bindings, input } => {
                self.splice(input, operators::alias(bindings.clone()))
            }
            QueryNode::Aggregate { input } => {
                self.visit(input)?;
                let root = std::mem::take(&mut self.root);
                self.reset(Tree::anon(Seq::lazy(root.into_leaves())));
                Ok(())
            }
            QueryNode::And(operands) => {
                let inputs = self.operand_leaves(operands)?;
                self.reset(Tree::anon(Seq::lazy(intersect(inputs))));
                Ok(())
            }
            QueryNode::Or(operands) => {
                let inputs = self.operand_leaves(operands)?;
                self.reset(Tree::anon(Seq::lazy(union(inputs))));
                Ok(())
            }
            QueryNode::IndexOr(operands) => {
                let inputs = operands
                    .iter()
                    .map(|operand| Ok(top_level(self.operand(operand)?)))
                    .collect::<QueryResult<Vec<_>>>()?;
                self.reset(Tree::anon(Seq::lazy(union(inputs))));
                Ok(())
            }
            QueryNode::Difference { left, right } => {
                let left = self.operand(left)?.into_leaves();
                let right = self.operand(right)?.into_leaves();
                self.reset(Tree::anon(Seq::lazy(difference(left, right))));
                Ok(())
            }
            QueryNode::Merge(operands) => {
                let mut merged: Option<Tree> = None;
                for operand in operands {
                    let tree = self.operand(operand)?;
                    merged = Some(match merged {
                        Some(acc) => merge_trees(acc, tree)?,
                        None => tree,
                    });
                }
                self.reset(merged.unwrap_or_default());
                Ok(())
            }
            QueryNode::Nest { key, input } => {
                self.visit(input)?;
                let inner = std::mem::take(&mut self.root);
                self.root = Tree::Map(vec![(Key::name(key.as_str()), inner)]);
                if let Some(cursor) = &mut self.cursor {
                    cursor.points = cursor.points.map(|path| path.prefixed(Step::Entry(0)));
                }
                Ok(())
            }
            QueryNode::Target { names, input } => {
                self.visit(input)?;
                self.target = Some(names.clone());
                Ok(())
            }
            QueryNode::Apply { subquery, input } => self.apply(subquery, input),
            QueryNode::Assoc { assoc_type, input } => self.assoc(assoc_type, input.as_deref()),
            QueryNode::Obj { input } => self.obj(input),
            QueryNode::Literal(values) => {
                let items = values.clone().into_iter().map(Item::from_value);
                self.reset(Tree::anon(Seq::lazy(items)));
                Ok(())
            }
            QueryNode::JsonLiteral(json) => {
                self.reset(tree_from_json(json));
                Ok(())
            }
            QueryNode::Exists { input } => self.exists(input),
            QueryNode::Join(_) => Err(QueryError::unsupported(node.tag())),
        }
    }

    fn reset(&mut self, root: Tree) {
        self.root = root;
        self.cursor = None;
    }

    /// Evaluate an operand of a set operator in its own executor.
    fn operand(&self, node: &QueryNode) -> QueryResult<Tree> {
        let mut child = self.child(self.scope.clone());
        child.visit(node)?;
        Ok(child.root)
    }

    fn operand_leaves(&self, operands: &[QueryNode]) -> QueryResult<Vec<ItemIter>> {
        operands
            .iter()
            .map(|operand| Ok(self.operand(operand)?.into_leaves()))
            .collect()
    }

    /// Visit `input`, then apply `transform` above its leaves.
    fn splice(&mut self, input: &QueryNode, transform: Transform) -> QueryResult<()> {
        self.visit(input)?;
        if self.cursor.is_none() {
            for seq in self.root.seqs_mut() {
                let current = std::mem::take(seq);
                *seq = current.apply(|items| transform(items));
            }
            return Ok(());
        }
        self.each_branch(|items| Ok(transform(Box::new(items.into_iter())).collect()))
    }

    /// Rewrite every branch eagerly: each top-level sequence without a
    /// cursor, each attached list with one.
    fn each_branch(
        &mut self,
        mut rewrite: impl FnMut(Vec<Item>) -> QueryResult<Vec<Item>>,
    ) -> QueryResult<()> {
        match &self.cursor {
            None => {
                for seq in self.root.seqs_mut() {
                    let items = std::mem::take(seq).into_vec();
                    *seq = Seq::buffered(rewrite(items)?);
                }
            }
            Some(cursor) => {
                for path in cursor.points.iter() {
                    let Some(item) = self.root.item_at_mut(&path) else {
                        continue;
                    };
                    let Some(slot) = item.get_mut(&cursor.key) else {
                        continue;
                    };
                    let items = match std::mem::replace(slot, Value::Null) {
                        Value::List(values) => values.into_iter().map(Item::from_value).collect(),
                        other => vec![Item::from_value(other)],
                    };
                    let rewritten = rewrite(items)?;
                    *slot = Value::List(rewritten.into_iter().map(Value::Record).collect());
                }
            }
        }
        Ok(())
    }

    fn assoc(&mut self, assoc_type: &str, input: Option<&QueryNode>) -> QueryResult<()> {
        if let Some(input) = input {
            self.visit(input)?;
        }
        let leaves = self.root.walk();
        let mut batch = AttachBatch::new(&mut self.root, assoc_type);
        for leaf in leaves {
            let Some(id) = leaf.item.id() else {
                continue;
            };
            tracing::trace!(assoc = assoc_type, id = %id, "association lookup");
            let edges = self.driver.association_lookup(assoc_type, id)?;
            batch.stage(leaf.path, edges);
        }
        let attached = batch.commit();
        self.cursor = Some(ParentCursor::new(attached, assoc_type));
        Ok(())
    }

    fn apply(&mut self, subquery: &QueryNode, input: &QueryNode) -> QueryResult<()> {
        self.visit(input)?;
        let origins = self.root.walk();
        let mut child = self.child(Some(origins.iter().map(|leaf| leaf.item.clone()).collect()));
        child.visit(subquery)?;
        if child.target.is_some() {
            self.target = child.target;
        }

        let sub_cursor = child.cursor;
        match child.root.into_single_seq() {
            Ok(seq) => self.graft_or_adopt(&origins, seq.into_vec(), sub_cursor),
            Err(shaped) => self.graft_under(&origins, shaped, sub_cursor),
        }
        Ok(())
    }

    fn graft_or_adopt(&mut self, origins: &[Leaf], results: Vec<Item>, sub_cursor: Option<ParentCursor>) {
        if let Some(results) = self.graft(origins, results, sub_cursor.as_ref()) {
            tracing::debug!(count = results.len(), "apply: adopting unmatched results");
            self.root = Tree::items(results);
            self.cursor = sub_cursor;
        }
    }

    /// Keep the mapping a sub-query built and hang a grafted copy of the
    /// current tree in place of each of its sequences.
    fn graft_under(&mut self, origins: &[Leaf], mut shaped: Tree, sub_cursor: Option<ParentCursor>) {
        let mut outer = std::mem::take(&mut self.root);
        let outer_cursor = self.cursor.take();
        let mut key = None;
        let mut points = Vec::new();

        for prefix in shaped.seq_prefixes() {
            let Some(slot) = shaped.subtree_mut(&prefix) else {
                continue;
            };
            let Tree::Seq(seq) = std::mem::take(slot) else {
                continue;
            };
            let branch_cursor = sub_cursor.as_ref().map(|cursor| {
                let within = cursor
                    .points
                    .iter()
                    .filter_map(|path| path.strip_prefix(&prefix))
                    .collect();
                ParentCursor::new(within, cursor.key.clone())
            });

            self.root = outer.snapshot();
            self.cursor = outer_cursor.clone();
            self.graft_or_adopt(origins, seq.into_vec(), branch_cursor);

            // A literal-shaped branch takes the place of the sequence itself.
            let (branch, lifted) = match std::mem::take(&mut self.root).into_single_seq() {
                Ok(seq) => (Tree::Seq(seq), true),
                Err(tree) => (tree, false),
            };
            *slot = branch;
            if let Some(cursor) = self.cursor.take() {
                points.extend(cursor.points.iter().map(|path| match path.steps() {
                    [Step::Entry(0), rest @ ..] if lifted => prefix.join(rest),
                    steps => prefix.join(steps),
                }));
                key = Some(cursor.key);
            }
        }

        self.root = shaped;
        self.cursor = key.map(|key| ParentCursor::new(points, key));
    }

    /// Put sub-query results back in place of the leaves they came from.
    ///
    /// Results match origins by identity; origins without a match are
    /// removed. Returns the results untouched when none of them matches.
    fn graft(
        &mut self,
        origins: &[Leaf],
        results: Vec<Item>,
        sub_cursor: Option<&ParentCursor>,
    ) -> Option<Vec<Item>> {
        let mut slots: HashMap<&Item, VecDeque<usize>> = HashMap::new();
        for (o, leaf) in origins.iter().enumerate() {
            slots.entry(&leaf.item).or_default().push_back(o);
        }
        let assignment: Vec<Option<usize>> = results
            .iter()
            .map(|item| slots.get_mut(item).and_then(VecDeque::pop_front))
            .collect();
        if !results.is_empty() && assignment.iter().all(Option::is_none) {
            return Some(results);
        }

        let mut used = vec![false; origins.len()];
        for (item, slot) in results.into_iter().zip(&assignment) {
            let Some(o) = *slot else { continue };
            used[o] = true;
            if let Some(target) = self.root.item_at_mut(&origins[o].path) {
                *target = item;
            }
        }

        let (key, mut points): (String, Vec<Path>) = match sub_cursor {
            Some(cursor) => (
                cursor.key.clone(),
                cursor
                    .points
                    .iter()
                    .filter_map(|path| translate(&path, &assignment, origins))
                    .collect(),
            ),
            None => match &self.cursor {
                Some(cursor) => (cursor.key.clone(), cursor.paths()),
                None => (String::new(), Vec::new()),
            },
        };

        let mut removed: Vec<&Path> = origins
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(leaf, _)| &leaf.path)
            .collect();
        removed.sort_by(|a, b| b.cmp(a));
        for path in removed {
            self.root.remove_at(path);
            points = points
                .into_iter()
                .filter_map(|point| point.shift_after_removal(path))
                .collect();
        }

        if sub_cursor.is_some() || self.cursor.is_some() {
            self.cursor = Some(ParentCursor::new(points, key));
        }
        None
    }

    fn obj(&mut self, input: &QueryNode) -> QueryResult<()> {
        self.visit(input)?;
        let driver = self.driver;
        self.each_branch(|items| resolve(driver, items))
    }

    fn exists(&mut self, input: &QueryNode) -> QueryResult<()> {
        let mut child = self.child(self.scope.clone());
        child.visit(input)?;
        self.settle_exists(child.root);
        Ok(())
    }

    /// Replace the tree by the `exists` sentinel if `found` has a leaf.
    /// Pulls at most one item.
    fn settle_exists(&mut self, found: Tree) {
        let found = found.into_leaves().next().is_some();

        let mut rows = Vec::new();
        if found {
            let mut sentinel = Item::new();
            sentinel.set(EXISTS_FIELD, true);
            if let Some(scope) = &self.scope {
                let ids = scope.iter().filter_map(|item| item.id().cloned()).collect();
                sentinel.set(SCOPE_FIELD, Value::List(ids));
            }
            rows.push(sentinel);
        }
        self.reset(Tree::items(rows));
    }
}

/// Map a sub-executor path onto the outer tree through the origin it
/// was grafted onto.
fn translate(path: &Path, assignment: &[Option<usize>], origins: &[Leaf]) -> Option<Path> {
    let steps = match path.steps() {
        [Step::Entry(0), rest @ ..] => rest,
        steps => steps,
    };
    let [Step::Item(s), rest @ ..] = steps else {
        return None;
    };
    let o = (*assignment.get(*s)?)?;
    Some(origins[o].path.join(rest))
}

/// Resolve identifiers to full records. Fields the lookup does not return
/// are carried over from the original item.
fn resolve(driver: &dyn Driver, items: Vec<Item>) -> QueryResult<Vec<Item>> {
    let ids: Vec<Value> = items.iter().filter_map(|item| item.id().cloned()).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    tracing::trace!(count = ids.len(), "object lookup");
    let found = driver.object_lookup(&ids)?;

    let mut originals: HashMap<Value, Item> = items
        .into_iter()
        .filter_map(|item| Some((item.id()?.clone(), item)))
        .collect();
    Ok(found
        .into_iter()
        .map(|mut record| {
            let original = record.id().and_then(|id| originals.remove(id));
            if let Some(original) = original {
                for (name, value) in original.into_fields() {
                    if !record.contains(&name) {
                        record.set(name, value);
                    }
                }
            }
            record
        })
        .collect())
}

fn top_level(tree: Tree) -> ItemIter {
    match tree {
        Tree::Seq(seq) => seq.into_iter(),
        Tree::Map(entries) => Box::new(entries.into_iter().flat_map(|(_, child)| top_level(child))),
    }
}

/// Edges staged for attachment. Whatever was staged is committed when the
/// batch ends, including on an early return.
struct AttachBatch<'t> {
    tree: &'t mut Tree,
    key: String,
    staged: Vec<(Path, Vec<Item>)>,
    attached: Vec<Path>,
}

impl<'t> AttachBatch<'t> {
    fn new(tree: &'t mut Tree, key: &str) -> Self {
        Self {
            tree,
            key: key.to_string(),
            staged: Vec::new(),
            attached: Vec::new(),
        }
    }

    fn stage(&mut self, path: Path, edges: Vec<Item>) {
        self.staged.push((path, edges));
    }

    fn flush(&mut self) {
        for (path, edges) in self.staged.drain(..) {
            if let Some(item) = self.tree.item_at_mut(&path) {
                item.set(self.key.as_str(), Value::List(edges.into_iter().map(Value::Record).collect()));
                self.attached.push(path);
            }
        }
    }

    fn commit(mut self) -> Vec<Path> {
        self.flush();
        std::mem::take(&mut self.attached)
    }
}

impl Drop for AttachBatch<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Seed a tree from an inline JSON document.
///
/// Objects whose every value is a list of objects (or another such object)
/// become mappings; anything else becomes a sequence of records, with bare
/// scalars read as identifiers.
fn tree_from_json(json: &Json) -> Tree {
    match json {
        Json::Object(map) if mapping_shaped(map) => mapping(map),
        Json::Array(values)
            if !values.is_empty()
                && values
                    .iter()
                    .all(|v| v.as_object().is_some_and(mapping_shaped)) =>
        {
            let entries = values
                .iter()
                .filter_map(Json::as_object)
                .flat_map(|map| map.iter().map(|(k, v)| (Key::name(k.as_str()), subtree(v))))
                .collect();
            Tree::Map(entries)
        }
        other => match subtree(other) {
            Tree::Seq(seq) => Tree::anon(seq),
            map => map,
        },
    }
}

fn mapping(map: &Map<String, Json>) -> Tree {
    Tree::Map(
        map.iter()
            .map(|(k, v)| (Key::name(k.as_str()), subtree(v)))
            .collect(),
    )
}

fn subtree(json: &Json) -> Tree {
    match json {
        Json::Object(map) if mapping_shaped(map) => mapping(map),
        Json::Array(values) => Tree::Seq(
            values
                .iter()
                .map(|v| Item::from_value(Value::from_json(v)))
                .collect(),
        ),
        other => Tree::Seq(Seq::buffered(vec![Item::from_value(Value::from_json(other))])),
    }
}

fn mapping_shaped(map: &Map<String, Json>) -> bool {
    !map.is_empty()
        && !map.contains_key(tangle_core::ID_FIELD)
        && map.values().all(|value| match value {
            Json::Array(values) => values.iter().all(Json::is_object),
            Json::Object(inner) => mapping_shaped(inner),
            _ => false,
        })
}
