//! Position caches tying logical items to their backing child nodes.
//!
//! Positions are child indexes within the binding's container. A binding
//! holds the only live borrow of the tree, so the only way positions can move
//! is through the binding's own mutations, and those go through the methods
//! below.

use indexmap::IndexMap;
use lims_xml::{Element, QName};

/// Child positions for a sequence binding, in logical order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ElemIndex(Vec<usize>);

impl ElemIndex {
    pub(crate) fn scan(container: &Element, tag: &QName) -> Self {
        Self(container.positions_of(tag))
    }

    pub(crate) fn get(&self, index: usize) -> Option<usize> {
        self.0.get(index).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Child position a node inserted at logical `index` should take: right
    /// before the node currently at `index`, else at the end of the container.
    pub(crate) fn slot(&self, index: usize, container_len: usize) -> usize {
        self.get(index).unwrap_or(container_len)
    }

    /// Record a node inserted at child position `pos` as logical `index`.
    pub(crate) fn insert(&mut self, index: usize, pos: usize) {
        shift_up(self.0.iter_mut(), pos);
        self.0.insert(index, pos);
    }

    /// Forget logical `index`, returning the child position it had.
    pub(crate) fn remove(&mut self, index: usize) -> usize {
        let pos = self.0.remove(index);
        shift_down(self.0.iter_mut(), pos);
        pos
    }

    /// Drain every position, highest first, so removing them in the returned
    /// order never invalidates the rest.
    pub(crate) fn drain_descending(&mut self) -> Vec<usize> {
        let mut all = std::mem::take(&mut self.0);
        all.sort_unstable_by(|a, b| b.cmp(a));
        all
    }
}

/// Child positions for a mapping binding, keyed and in document order.
///
/// Every bound node is tracked: a repeated key keeps all of its positions,
/// the first being the live entry, and bound nodes without a key are kept
/// aside so `drain_descending` still reaches them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct KeyedElems {
    keyed: IndexMap<String, Vec<usize>>,
    unkeyed: Vec<usize>,
}

impl KeyedElems {
    /// Index the children of `container` accepted by `bound`, keyed by
    /// `key_of`.
    pub(crate) fn scan(
        container: &Element,
        bound: impl Fn(&Element) -> bool,
        mut key_of: impl FnMut(&Element) -> Option<String>,
    ) -> Self {
        let mut elems = Self::default();
        for (pos, child) in container.children().iter().enumerate() {
            if !bound(child) {
                continue;
            }
            match key_of(child) {
                Some(key) => {
                    if elems.keyed.contains_key(&key) {
                        tracing::warn!(%key, element = %child.name, "duplicate key in document, the first one is used");
                    }
                    elems.keyed.entry(key).or_default().push(pos);
                }
                None => {
                    tracing::warn!(element = %child.name, pos, "bound node without a key");
                    elems.unkeyed.push(pos);
                }
            }
        }
        elems
    }

    pub(crate) fn len(&self) -> usize {
        self.keyed.len()
    }

    pub(crate) fn get(&self, key: &str) -> Option<usize> {
        self.keyed.get(key).and_then(|p| p.first()).copied()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.keyed.contains_key(key)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.keyed.keys().map(String::as_str)
    }

    /// Record a node appended at child position `pos`.
    pub(crate) fn push(&mut self, key: String, pos: usize) {
        shift_up(self.all_mut(), pos);
        self.keyed.entry(key).or_default().push(pos);
    }

    /// Forget `key`, returning every child position it had, highest first.
    pub(crate) fn remove(&mut self, key: &str) -> Option<Vec<usize>> {
        let mut removed = self.keyed.shift_remove(key)?;
        removed.sort_unstable_by(|a, b| b.cmp(a));
        for &pos in &removed {
            shift_down(self.all_mut(), pos);
        }
        Some(removed)
    }

    pub(crate) fn drain_descending(&mut self) -> Vec<usize> {
        let mut all: Vec<usize> = std::mem::take(&mut self.keyed)
            .into_values()
            .flatten()
            .chain(std::mem::take(&mut self.unkeyed))
            .collect();
        all.sort_unstable_by(|a, b| b.cmp(a));
        all
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut usize> + '_ {
        self.keyed
            .values_mut()
            .flat_map(|p| p.iter_mut())
            .chain(self.unkeyed.iter_mut())
    }
}

/// Remove the children at `positions` (highest first), returning them in the
/// same order.
pub(crate) fn remove_children(container: &mut Element, positions: &[usize]) -> Vec<Element> {
    positions
        .iter()
        .filter_map(|&pos| container.remove_child(pos))
        .collect()
}

fn shift_up<'a>(positions: impl Iterator<Item = &'a mut usize>, inserted: usize) {
    for p in positions {
        if *p >= inserted {
            *p += 1;
        }
    }
}

fn shift_down<'a>(positions: impl Iterator<Item = &'a mut usize>, removed: usize) {
    for p in positions {
        if *p > removed {
            *p -= 1;
        }
    }
}
