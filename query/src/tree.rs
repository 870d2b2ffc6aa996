//! The hierarchical result tree and addresses into it.
//!
//! A tree is either a leaf sequence of items or a mapping from keys to
//! subtrees. Deeper hierarchy levels produced by association attachment live
//! inside the items themselves, as list fields holding edge records. A `Path`
//! addresses one item anywhere in that structure.

use crate::seq::Seq;
use std::fmt;
use tangle_core::{Item, Value};

/// Key of an interior mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// The marker used for roots seeded by literals.
    Anon,
    Name(String),
}

impl Key {
    pub fn name(name: impl Into<String>) -> Self {
        Key::Name(name.into())
    }

    /// Render the key, substituting `anonymous` for the anonymous marker.
    pub fn render<'a>(&'a self, anonymous: &'a str) -> &'a str {
        match self {
            Key::Anon => anonymous,
            Key::Name(name) => name,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render("_"))
    }
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Entry of a mapping, by position.
    Entry(usize),
    /// Item of a sequence or element of a list field, by position.
    Item(usize),
    /// A list-valued field of the enclosing item.
    Field(String),
}

/// Address of an item inside a tree: `Entry* Item (Field Item)*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<Step>);

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    /// This path followed by `rest`.
    pub fn join(&self, rest: &[Step]) -> Path {
        let mut steps = self.0.clone();
        steps.extend_from_slice(rest);
        Path(steps)
    }

    /// This path with `step` in front.
    pub fn prefixed(&self, step: Step) -> Path {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.push(step);
        steps.extend_from_slice(&self.0);
        Path(steps)
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The steps after `prefix`, if this path starts with it.
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        self.0.strip_prefix(prefix.0.as_slice()).map(|rest| Path(rest.to_vec()))
    }

    /// Rewrite this path after the item at `removed` was taken out of its
    /// container. Paths at or under the removed item are gone; later siblings
    /// move up by one.
    pub fn shift_after_removal(mut self, removed: &Path) -> Option<Path> {
        if self.starts_with(removed) {
            return None;
        }
        let depth = removed.0.len();
        if self.0.len() >= depth && self.0[..depth - 1] == removed.0[..depth - 1] {
            if let (Step::Item(mine), Step::Item(gone)) = (&mut self.0[depth - 1], &removed.0[depth - 1]) {
                if *mine > *gone {
                    *mine -= 1;
                }
            }
        }
        Some(self)
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Path(steps)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            match step {
                Step::Entry(n) => write!(f, "{{{}}}", n)?,
                Step::Item(n) => write!(f, "{}", n)?,
                Step::Field(name) => write!(f, "{}", name)?,
            }
        }
        Ok(())
    }
}

/// A result tree under construction.
#[derive(Debug)]
pub enum Tree {
    Seq(Seq),
    Map(Vec<(Key, Tree)>),
}

impl Default for Tree {
    fn default() -> Self {
        Tree::Map(Vec::new())
    }
}

impl Tree {
    /// A root holding `seq` under the anonymous key.
    pub fn anon(seq: Seq) -> Tree {
        Tree::Map(vec![(Key::Anon, Tree::Seq(seq))])
    }

    /// A root holding buffered `items` under the anonymous key.
    pub fn items(items: Vec<Item>) -> Tree {
        Tree::anon(Seq::buffered(items))
    }

    /// Buffer every sequence in the tree.
    pub fn force(&mut self) {
        match self {
            Tree::Seq(seq) => {
                seq.force();
            }
            Tree::Map(entries) => entries.iter_mut().for_each(|(_, child)| child.force()),
        }
    }

    /// Every sequence reachable through mappings, in entry order.
    pub fn seqs_mut(&mut self) -> Vec<&mut Seq> {
        let mut out = Vec::new();
        collect_seqs(self, &mut out);
        out
    }

    /// The single anonymous sequence of a literal-shaped root.
    pub fn into_single_seq(self) -> Result<Seq, Tree> {
        match self {
            Tree::Seq(seq) => Ok(seq),
            Tree::Map(mut entries)
                if entries.len() == 1 && matches!(entries[0], (Key::Anon, Tree::Seq(_))) =>
            {
                match entries.pop() {
                    Some((_, Tree::Seq(seq))) => Ok(seq),
                    Some(other) => Err(Tree::Map(vec![other])),
                    None => Err(Tree::Map(entries)),
                }
            }
            other => Err(other),
        }
    }

    /// Entry steps leading to each sequence, in entry order.
    pub fn seq_prefixes(&self) -> Vec<Path> {
        let mut out = Vec::new();
        collect_prefixes(self, &mut Path::new(), &mut out);
        out
    }

    /// The subtree reached by following the entry steps of `prefix`.
    pub fn subtree_mut(&mut self, prefix: &Path) -> Option<&mut Tree> {
        prefix.steps().iter().try_fold(self, |tree, step| match (tree, step) {
            (Tree::Map(entries), Step::Entry(i)) => entries.get_mut(*i).map(|(_, child)| child),
            _ => None,
        })
    }

    /// A buffered copy of the tree. Buffers every sequence of `self`.
    pub fn snapshot(&mut self) -> Tree {
        match self {
            Tree::Seq(seq) => Tree::Seq(Seq::buffered(seq.force().clone())),
            Tree::Map(entries) => Tree::Map(
                entries
                    .iter_mut()
                    .map(|(key, child)| (key.clone(), child.snapshot()))
                    .collect(),
            ),
        }
    }

    /// The item at `path`, buffering sequences on the way.
    pub fn item_at_mut(&mut self, path: &Path) -> Option<&mut Item> {
        descend(self, path.steps())
    }

    /// Take the item at `path` out of its sequence or list field.
    pub fn remove_at(&mut self, path: &Path) -> Option<Item> {
        let (last, parent) = path.steps().split_last()?;
        let Step::Item(index) = *last else {
            return None;
        };
        match parent.split_last() {
            Some((Step::Field(name), owner)) => {
                let owner = descend(self, owner)?;
                match owner.get_mut(name)? {
                    Value::List(values) if index < values.len() => {
                        Some(Item::from_value(values.remove(index)))
                    }
                    _ => None,
                }
            }
            _ => {
                let items = seq_at(self, parent)?.force();
                (index < items.len()).then(|| items.remove(index))
            }
        }
    }
}

fn collect_seqs<'t>(tree: &'t mut Tree, out: &mut Vec<&'t mut Seq>) {
    match tree {
        Tree::Seq(seq) => out.push(seq),
        Tree::Map(entries) => {
            for (_, child) in entries.iter_mut() {
                collect_seqs(child, out);
            }
        }
    }
}

fn collect_prefixes(tree: &Tree, prefix: &mut Path, out: &mut Vec<Path>) {
    match tree {
        Tree::Seq(_) => out.push(prefix.clone()),
        Tree::Map(entries) => {
            for (i, (_, child)) in entries.iter().enumerate() {
                prefix.push(Step::Entry(i));
                collect_prefixes(child, prefix, out);
                prefix.0.pop();
            }
        }
    }
}

fn seq_at<'t>(tree: &'t mut Tree, steps: &[Step]) -> Option<&'t mut Seq> {
    match (tree, steps.split_first()) {
        (Tree::Seq(seq), None) => Some(seq),
        (Tree::Map(entries), Some((Step::Entry(i), rest))) => seq_at(&mut entries.get_mut(*i)?.1, rest),
        _ => None,
    }
}

fn descend<'t>(tree: &'t mut Tree, steps: &[Step]) -> Option<&'t mut Item> {
    match (tree, steps.split_first()?) {
        (Tree::Map(entries), (Step::Entry(i), rest)) => descend(&mut entries.get_mut(*i)?.1, rest),
        (Tree::Seq(seq), (Step::Item(j), rest)) => descend_item(seq.force().get_mut(*j)?, rest),
        _ => None,
    }
}

fn descend_item<'t>(item: &'t mut Item, steps: &[Step]) -> Option<&'t mut Item> {
    match steps {
        [] => Some(item),
        [Step::Field(name), Step::Item(k), rest @ ..] => match item.get_mut(name)? {
            Value::List(values) => match values.get_mut(*k)? {
                Value::Record(inner) => descend_item(inner, rest),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}
