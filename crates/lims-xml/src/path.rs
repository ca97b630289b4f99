//! Nesting paths: chains of single-occurrence container elements between a
//! document root and the nodes a binding works on.

use tracing::trace;

use crate::{Element, QName};

/// Ordered container tag names, outermost first.
pub type Path = Vec<QName>;

/// Build a [`Path`] of un-namespaced tags.
///
/// ```
/// use lims_xml::{path::nesting, QName};
///
/// assert_eq!(nesting(&["a", "b"]), vec![QName::local("a"), QName::local("b")]);
/// ```
pub fn nesting(tags: &[&str]) -> Path {
    tags.iter().map(|t| QName::local(*t)).collect()
}

/// Check if a path addresses the root itself.
pub fn is_root(path: &[QName]) -> bool {
    path.is_empty()
}

/// Walk `path` from `root`, creating every missing container.
///
/// Each step takes the first child with the step's name. A missing step is
/// appended as the last child of the current element, and every remaining
/// step is created beneath it, exactly once. Existing children are never
/// reordered. An empty path returns `root`.
///
/// ```
/// use lims_xml::{path::nesting, resolve, Element, QName};
///
/// let mut root = Element::new("entry").with_child(Element::new("other"));
/// resolve(&mut root, &nesting(&["a", "b"])).set_text("x");
/// resolve(&mut root, &nesting(&["a", "b"])).set_text("y");
///
/// assert_eq!(root.child_count(), 2);
/// assert_eq!(root.child(0).unwrap().name, QName::local("other"));
/// let a = root.find(&QName::local("a")).unwrap();
/// assert_eq!(a.child_count(), 1);
/// assert_eq!(a.find(&QName::local("b")).unwrap().text(), Some("y"));
/// ```
pub fn resolve<'a>(root: &'a mut Element, path: &[QName]) -> &'a mut Element {
    let mut current = root;
    for step in path {
        let idx = match current.children.iter().position(|c| &c.name == step) {
            Some(idx) => idx,
            None => {
                trace!(parent = %current.name, container = %step, "creating nesting container");
                current.push(Element::new(step.clone()))
            }
        };
        current = &mut current.children[idx];
    }
    current
}

/// Walk `path` from `root` without creating anything.
///
/// Returns `None` as soon as a step is missing.
pub fn lookup<'a>(root: &'a Element, path: &[QName]) -> Option<&'a Element> {
    let mut current = root;
    for step in path {
        current = current.find(step)?;
    }
    Some(current)
}

/// Mutable variant of [`lookup`].
pub fn lookup_mut<'a>(root: &'a mut Element, path: &[QName]) -> Option<&'a mut Element> {
    let mut current = root;
    for step in path {
        current = current.find_mut(step)?;
    }
    Some(current)
}
