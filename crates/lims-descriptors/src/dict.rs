//! Untyped mapping bindings: child tags of one container, or the attributes
//! of one element.

use lims_xml::path::nesting;
use lims_xml::{lookup, lookup_mut, resolve, Element, Path, QName};
use tracing::debug;

use crate::elems::{remove_children, KeyedElems};
use crate::{BindError, Result};

/// Child tag → child text under one container element.
///
/// ```
/// use lims_descriptors::SubTagDictionary;
/// use lims_xml::Element;
///
/// let mut root = Element::parse("<e><test-tag><key1>value1</key1></test-tag></e>").unwrap();
/// let mut dict = SubTagDictionary::new(&mut root, "test-tag", &[]);
/// dict.set("key2", "value2");
/// assert_eq!(dict.get("key1").unwrap(), Some("value1"));
/// assert_eq!(dict.len(), 2);
/// ```
pub struct SubTagDictionary<'a> {
    root: &'a mut Element,
    path: Path,
    keys: KeyedElems,
}

impl<'a> SubTagDictionary<'a> {
    pub fn new(root: &'a mut Element, tag: &str, nested: &[&str]) -> Self {
        let mut path = nesting(nested);
        path.push(QName::local(tag));
        let keys = lookup(root, &path)
            .map(|c| KeyedElems::scan(c, |_| true, |child| Some(child.name.to_string())))
            .unwrap_or_default();
        Self { root, path, keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys.keys()
    }

    /// `Ok(None)` for a present child without text.
    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        let pos = self
            .keys
            .get(key)
            .ok_or_else(|| BindError::MissingKey(key.to_owned()))?;
        Ok(lookup(&*self.root, &self.path)
            .and_then(|c| c.child(pos))
            .and_then(Element::text))
    }

    /// Update the child's text, or append a new child for a new key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let container = resolve(self.root, &self.path);
        match self.keys.get(key).and_then(|pos| container.child_mut(pos)) {
            Some(child) => child.set_text(value),
            None => {
                let pos = container.push(Element::new(QName::from_clark(key)).with_text(value));
                debug!(%key, pos, "added sub-tag");
                self.keys.push(key.to_owned(), pos);
            }
        }
    }

    /// Remove the child (and any repeat of its tag), returning the text of
    /// the first one.
    pub fn remove(&mut self, key: &str) -> Result<Option<String>> {
        let positions = self
            .keys
            .remove(key)
            .ok_or_else(|| BindError::MissingKey(key.to_owned()))?;
        let removed = lookup_mut(self.root, &self.path)
            .map(|c| remove_children(c, &positions))
            .unwrap_or_default();
        Ok(removed.last().and_then(|e| e.text().map(str::to_owned)))
    }

    pub fn clear(&mut self) {
        let positions = self.keys.drain_descending();
        if let Some(container) = lookup_mut(self.root, &self.path) {
            remove_children(container, &positions);
        }
    }

    pub fn items(&self) -> Vec<(String, Option<String>)> {
        let container = lookup(&*self.root, &self.path);
        self.keys
            .keys()
            .map(|key| {
                let text = container
                    .zip(self.keys.get(key))
                    .and_then(|(c, pos)| c.child(pos))
                    .and_then(Element::text)
                    .map(str::to_owned);
                (key.to_owned(), text)
            })
            .collect()
    }
}

/// Attributes of the `position`-th element named `tag`, as a mapping.
///
/// The element itself is not created: writing through a projection onto a
/// missing sibling is an error.
pub struct AttributeDict<'a> {
    root: &'a mut Element,
    nesting: Path,
    tag: QName,
    position: usize,
}

impl<'a> AttributeDict<'a> {
    pub fn new(root: &'a mut Element, tag: &str, position: usize, nested: &[&str]) -> Self {
        Self {
            root,
            nesting: nesting(nested),
            tag: QName::local(tag),
            position,
        }
    }

    fn node(&self) -> Option<&Element> {
        lookup(&*self.root, &self.nesting)?
            .find_all(&self.tag)
            .nth(self.position)
    }

    fn node_mut(&mut self) -> Result<&mut Element> {
        let container = lookup_mut(self.root, &self.nesting)
            .ok_or_else(|| BindError::MissingElement(self.tag.to_string()))?;
        let positions = container.positions_of(&self.tag);
        let len = positions.len();
        positions
            .get(self.position)
            .and_then(|&pos| container.child_mut(pos))
            .ok_or(BindError::IndexOutOfRange {
                index: self.position,
                len,
            })
    }

    /// Number of attributes on this one element.
    pub fn len(&self) -> usize {
        self.node().map_or(0, |n| n.attributes().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Result<&str> {
        self.node()
            .and_then(|n| n.attr(key))
            .ok_or_else(|| BindError::MissingKey(key.to_owned()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.node().is_some_and(|n| n.attr(key).is_some())
    }

    pub fn keys(&self) -> Vec<String> {
        self.node()
            .map(|n| n.attributes().keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.node()
            .into_iter()
            .flat_map(|n| n.attributes().iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.node_mut()?.set_attr(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<String> {
        self.node_mut()?
            .remove_attr(key)
            .ok_or_else(|| BindError::MissingKey(key.to_owned()))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.node_mut()?.attributes_mut().clear();
        Ok(())
    }
}
