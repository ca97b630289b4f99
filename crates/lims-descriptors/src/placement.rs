//! Well coordinate → artifact mapping over `<placement>` children.

use lims_xml::path::nesting;
use lims_xml::{lookup, lookup_mut, resolve, Element, Path, QName};
use tracing::debug;

use crate::elems::{remove_children, KeyedElems};
use crate::entity::{Entity, EntityKind, EntityRef, IdentityCache};
use crate::reference::read_uri;
use crate::{BindError, Result};

/// `<placement uri=".." limsid=".."><value>A:1</value></placement>`, keyed by
/// the coordinate in `value`.
pub struct PlacementDictionary<'a, 'c> {
    root: &'a mut Element,
    nesting: Path,
    tag: QName,
    cache: &'c dyn IdentityCache,
    placements: KeyedElems,
}

fn coordinate(node: &Element) -> Option<String> {
    node.find(&QName::local("value"))
        .and_then(Element::text)
        .map(str::to_owned)
}

impl<'a, 'c> PlacementDictionary<'a, 'c> {
    pub fn new(root: &'a mut Element, cache: &'c dyn IdentityCache, nested: &[&str]) -> Self {
        let nesting = nesting(nested);
        let tag = QName::local("placement");
        let placements = lookup(root, &nesting)
            .map(|c| {
                KeyedElems::scan(c, |child| child.name == tag, coordinate)
            })
            .unwrap_or_default();
        Self {
            root,
            nesting,
            tag,
            cache,
            placements,
        }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.len() == 0
    }

    pub fn contains_key(&self, coordinate: &str) -> bool {
        self.placements.contains(coordinate)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.placements.keys()
    }

    pub fn get(&self, coordinate: &str) -> Result<EntityRef> {
        let node = self
            .placements
            .get(coordinate)
            .and_then(|pos| lookup(&*self.root, &self.nesting)?.child(pos))
            .ok_or_else(|| BindError::MissingKey(coordinate.to_owned()))?;
        read_uri(node, "uri", EntityKind::Artifact, self.cache)
    }

    pub fn items(&self) -> Result<Vec<(String, EntityRef)>> {
        self.placements
            .keys()
            .map(|k| Ok((k.to_owned(), self.get(k)?)))
            .collect()
    }

    /// Point `coordinate` at `artifact`. An existing placement is rewritten in
    /// place; otherwise a new one is appended.
    pub fn set(&mut self, coordinate: &str, artifact: &Entity) {
        let container = resolve(self.root, &self.nesting);
        if let Some(node) = self
            .placements
            .get(coordinate)
            .and_then(|pos| container.child_mut(pos))
        {
            node.set_attr("uri", artifact.uri());
            node.set_attr("limsid", artifact.id());
            return;
        }
        let node = Element::new(self.tag.clone())
            .with_attr("uri", artifact.uri())
            .with_attr("limsid", artifact.id())
            .with_child(Element::new("value").with_text(coordinate));
        let pos = container.push(node);
        debug!(%coordinate, artifact = %artifact.uri(), pos, "added placement");
        self.placements.push(coordinate.to_owned(), pos);
    }

    /// Remove every placement at `coordinate`.
    pub fn remove(&mut self, coordinate: &str) -> Result<()> {
        let positions = self
            .placements
            .remove(coordinate)
            .ok_or_else(|| BindError::MissingKey(coordinate.to_owned()))?;
        if let Some(container) = lookup_mut(self.root, &self.nesting) {
            remove_children(container, &positions);
        }
        Ok(())
    }

    /// Remove every placement, including ones without a coordinate;
    /// unrelated siblings stay.
    pub fn clear(&mut self) {
        let positions = self.placements.drain_descending();
        if let Some(container) = lookup_mut(self.root, &self.nesting) {
            remove_children(container, &positions);
        }
    }
}
