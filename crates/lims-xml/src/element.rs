//! The owned element tree.

use indexmap::IndexMap;

use crate::QName;

/// Attribute table of one element: unique keys, document order preserved.
///
/// Namespaced attributes are keyed by their Clark form (`{uri}local`).
pub type Attributes = IndexMap<String, String>;

/// One XML element: name, attributes, optional text and ordered children.
///
/// Whitespace-only text of a parsed document is not stored, so indentation
/// never shows up as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: QName,
    pub(crate) attrs: Attributes,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<QName>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    // ── Attributes ─────────────────────────────────────────────────────────

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Set an attribute. An existing key keeps its position.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Remove an attribute, keeping the order of the remaining ones.
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        self.attrs.shift_remove(key)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    // ── Text ───────────────────────────────────────────────────────────────

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
    }

    pub fn clear_text(&mut self) {
        self.text = None;
    }

    // ── Children ───────────────────────────────────────────────────────────

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children.get_mut(index)
    }

    /// First direct child called `name`.
    pub fn find(&self, name: &QName) -> Option<&Element> {
        self.children.iter().find(|c| &c.name == name)
    }

    pub fn find_mut(&mut self, name: &QName) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| &c.name == name)
    }

    /// All direct children called `name`, in document order.
    pub fn find_all<'a, 'n>(&'a self, name: &'n QName) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter(move |c| &c.name == name)
    }

    /// Child indexes of every direct child called `name`.
    pub fn positions_of(&self, name: &QName) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, c)| &c.name == name)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn count(&self, name: &QName) -> usize {
        self.find_all(name).count()
    }

    /// Append a child and return its index.
    pub fn push(&mut self, child: Element) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    /// Insert a child at `index`, clamped to the end.
    pub fn insert_child(&mut self, index: usize, child: Element) -> usize {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        index
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Element> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    pub fn retain_children(&mut self, keep: impl FnMut(&Element) -> bool) {
        self.children.retain(keep);
    }

    /// Depth-first, pre-order walk over this element and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let el = self.stack.pop()?;
        // Reverse so the first child is popped first.
        self.stack.extend(el.children.iter().rev());
        Some(el)
    }
}
