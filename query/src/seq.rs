//! Lazy item sequences and the buffer-once replayable cursor.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tangle_core::Item;

/// A boxed, pull-based stream of items.
pub type ItemIter = Box<dyn Iterator<Item = Item>>;

/// An ordered sequence of items at a leaf of the result tree.
///
/// A sequence starts lazy and is buffered in place the first time something
/// needs to address its items by position.
pub struct Seq {
    /// Items not yet pulled. `None` once the sequence is buffered.
    source: Option<ItemIter>,
    buffer: Vec<Item>,
}

impl Default for Seq {
    fn default() -> Self {
        Self::buffered(Vec::new())
    }
}

impl Seq {
    pub fn lazy(iter: impl Iterator<Item = Item> + 'static) -> Self {
        Self {
            source: Some(Box::new(iter)),
            buffer: Vec::new(),
        }
    }

    pub fn buffered(items: Vec<Item>) -> Self {
        Self {
            source: None,
            buffer: items,
        }
    }

    /// A sequence whose items are computed as a whole on first pull.
    pub fn deferred(compute: impl FnOnce() -> Vec<Item> + 'static) -> Self {
        Self::lazy(std::iter::once_with(compute).flatten())
    }

    pub fn is_buffered(&self) -> bool {
        self.source.is_none()
    }

    /// Buffer the sequence in place and expose its items.
    pub fn force(&mut self) -> &mut Vec<Item> {
        if let Some(iter) = self.source.take() {
            self.buffer.extend(iter);
        }
        &mut self.buffer
    }

    /// Pull the next item without buffering the rest.
    pub fn next_item(&mut self) -> Option<Item> {
        if !self.buffer.is_empty() {
            return Some(self.buffer.remove(0));
        }
        self.source.as_mut()?.next()
    }

    /// Replace this sequence by `f` applied to its stream. Stays lazy.
    pub fn apply(self, f: impl FnOnce(ItemIter) -> ItemIter) -> Seq {
        Seq {
            source: Some(f(self.into_iter())),
            buffer: Vec::new(),
        }
    }

    pub fn into_vec(mut self) -> Vec<Item> {
        self.force();
        self.buffer
    }
}

impl IntoIterator for Seq {
    type Item = Item;
    type IntoIter = ItemIter;

    fn into_iter(self) -> ItemIter {
        match self.source {
            None => Box::new(self.buffer.into_iter()),
            Some(iter) if self.buffer.is_empty() => iter,
            Some(iter) => Box::new(self.buffer.into_iter().chain(iter)),
        }
    }
}

impl FromIterator<Item> for Seq {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Seq::buffered(iter.into_iter().collect())
    }
}

impl fmt::Debug for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(_) => write!(f, "Seq(<lazy>)"),
            None => f.debug_list().entries(&self.buffer).finish(),
        }
    }
}

/// Collect `iter` on first pull, hand the whole vector to `f`, then stream
/// the result.
pub(crate) fn defer(
    iter: ItemIter,
    f: impl FnOnce(Vec<Item>) -> Vec<Item> + 'static,
) -> ItemIter {
    Box::new(std::iter::once_with(move || f(iter.collect())).flatten())
}

/// A sequence that is buffered once and can be replayed by any number of
/// independent cursors without recomputing its source.
pub struct Replay<T> {
    shared: Rc<RefCell<ReplayState<T>>>,
}

struct ReplayState<T> {
    source: Option<Box<dyn Iterator<Item = T>>>,
    buffer: Vec<T>,
}

impl<T> Clone for Replay<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Clone + 'static> Replay<T> {
    pub fn new(source: impl Iterator<Item = T> + 'static) -> Self {
        Self {
            shared: Rc::new(RefCell::new(ReplayState {
                source: Some(Box::new(source)),
                buffer: Vec::new(),
            })),
        }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(ReplayState {
                source: None,
                buffer: items,
            })),
        }
    }

    /// A fresh cursor positioned at the start.
    pub fn iter(&self) -> ReplayIter<T> {
        ReplayIter {
            shared: Rc::clone(&self.shared),
            pos: 0,
        }
    }

    /// Number of elements pulled from the source so far.
    pub fn buffered_len(&self) -> usize {
        self.shared.borrow().buffer.len()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// A new replay holding `f` applied to every element.
    pub fn map<U: Clone + 'static>(&self, f: impl FnMut(T) -> U) -> Replay<U> {
        Replay::from_vec(self.iter().map(f).collect())
    }
}

impl<T> fmt::Debug for Replay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.borrow();
        f.debug_struct("Replay")
            .field("buffered", &state.buffer.len())
            .field("exhausted", &state.source.is_none())
            .finish()
    }
}

/// An independent read position over a `Replay`.
pub struct ReplayIter<T> {
    shared: Rc<RefCell<ReplayState<T>>>,
    pos: usize,
}

impl<T: Clone> Iterator for ReplayIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut state = self.shared.borrow_mut();
        if self.pos >= state.buffer.len() {
            let pulled = state.source.as_mut()?.next();
            match pulled {
                Some(value) => state.buffer.push(value),
                None => {
                    state.source = None;
                    return None;
                }
            }
        }
        let value = state.buffer.get(self.pos).cloned();
        self.pos += 1;
        value
    }
}
