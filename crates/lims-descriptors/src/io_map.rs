//! Read-only view of a process's `<input-output-map>` elements.

use indexmap::IndexMap;
use lims_xml::path::nesting;
use lims_xml::{lookup, Element, Path, QName};

use crate::entity::{EntityKind, EntityRef, IdentityCache};
use crate::reference::read_uri;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum IoValue {
    Text(String),
    Entity(EntityRef),
}

impl IoValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            IoValue::Text(s) => Some(s),
            IoValue::Entity(_) => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            IoValue::Entity(e) => Some(e),
            IoValue::Text(_) => None,
        }
    }
}

/// One side of a mapping: attribute name → value, in document order.
pub type IoSide = IndexMap<String, IoValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct IoMapping {
    pub input: IoSide,
    /// Absent for inputs that produced no per-input output.
    pub output: Option<IoSide>,
}

/// Every `input-output-map` child, decoded on each read.
#[derive(Debug, Clone)]
pub struct InputOutputMapList {
    nesting: Path,
    tag: QName,
}

impl Default for InputOutputMapList {
    fn default() -> Self {
        Self::nested(&[])
    }
}

impl InputOutputMapList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nested(nested: &[&str]) -> Self {
        Self {
            nesting: nesting(nested),
            tag: QName::local("input-output-map"),
        }
    }

    pub fn get(&self, root: &Element, cache: &dyn IdentityCache) -> Result<Vec<IoMapping>> {
        let Some(container) = lookup(root, &self.nesting) else {
            return Ok(Vec::new());
        };
        container
            .find_all(&self.tag)
            .map(|map| {
                let input = map
                    .find(&QName::local("input"))
                    .map(|node| read_side(node, cache))
                    .transpose()?
                    .unwrap_or_default();
                let output = map
                    .find(&QName::local("output"))
                    .map(|node| read_side(node, cache))
                    .transpose()?;
                Ok(IoMapping { input, output })
            })
            .collect()
    }
}

/// `uri` becomes the artifact; a nested `parent-process` becomes a process
/// entry; other attributes stay text.
fn read_side(node: &Element, cache: &dyn IdentityCache) -> Result<IoSide> {
    let mut side = IoSide::new();
    for (key, value) in node.attributes() {
        let value = match key.as_str() {
            "uri" => IoValue::Entity(cache.resolve(EntityKind::Artifact, value)),
            _ => IoValue::Text(value.clone()),
        };
        side.insert(key.clone(), value);
    }
    if let Some(parent) = node.find(&QName::local("parent-process")) {
        let process = read_uri(parent, "uri", EntityKind::Process, cache)?;
        side.insert("parent-process".to_owned(), IoValue::Entity(process));
    }
    Ok(side)
}
