//! Entity reference resolution: `uri` attributes ↔ cached entities.

use lims_xml::path::nesting;
use lims_xml::{lookup, resolve, Element, Path, QName};

use crate::entity::{Entity, EntityKind, EntityRef, IdentityCache};
use crate::list::{EntityItem, EntityList, ItemCodec};
use crate::{BindError, Result};

/// Resolve the URI held in `attr` of `node`.
pub(crate) fn read_uri(
    node: &Element,
    attr: &'static str,
    kind: EntityKind,
    cache: &dyn IdentityCache,
) -> Result<EntityRef> {
    let uri = node.attr(attr).ok_or_else(|| BindError::MissingAttribute {
        element: node.name.to_string(),
        attr,
    })?;
    Ok(cache.resolve(kind, uri))
}

/// `<location><container uri/><value>A:1</value></location>`
pub(crate) fn read_location(
    location: &Element,
    cache: &dyn IdentityCache,
) -> Result<(EntityRef, String)> {
    let container = location
        .find(&QName::local("container"))
        .ok_or_else(|| BindError::MissingElement("location/container".to_owned()))?;
    let container = read_uri(container, "uri", EntityKind::Container, cache)?;
    let value = location
        .find(&QName::local("value"))
        .and_then(Element::text)
        .ok_or_else(|| BindError::MissingElement("location/value".to_owned()))?;
    Ok((container, value.to_owned()))
}

pub(crate) fn write_location(location: &mut Element, container: &Entity, value: &str) {
    resolve(location, &nesting(&["container"])).set_attr("uri", container.uri());
    resolve(location, &nesting(&["value"])).set_text(value);
}

/// Single entity held in the `uri` attribute of a (nested) child element.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    path: Path,
    kind: EntityKind,
}

impl EntityDescriptor {
    pub fn new(tag: &str, kind: EntityKind) -> Self {
        Self::nested(tag, kind, &[])
    }

    pub fn nested(tag: &str, kind: EntityKind, nested: &[&str]) -> Self {
        let mut path = nesting(nested);
        path.push(QName::local(tag));
        Self { path, kind }
    }

    /// `None` when the element is absent.
    pub fn get(&self, root: &Element, cache: &dyn IdentityCache) -> Result<Option<EntityRef>> {
        lookup(root, &self.path)
            .map(|node| read_uri(node, "uri", self.kind, cache))
            .transpose()
    }

    pub fn set(&self, root: &mut Element, entity: &Entity) {
        resolve(root, &self.path).set_attr("uri", entity.uri());
    }
}

/// Single entity whose URI sits in an attribute of the root element.
#[derive(Debug, Clone)]
pub struct EntityAttributeDescriptor {
    attr: &'static str,
    kind: EntityKind,
}

impl EntityAttributeDescriptor {
    pub fn new(attr: &'static str, kind: EntityKind) -> Self {
        Self { attr, kind }
    }

    pub fn get(&self, root: &Element, cache: &dyn IdentityCache) -> Option<EntityRef> {
        root.attr(self.attr).map(|uri| cache.resolve(self.kind, uri))
    }

    pub fn set(&self, root: &mut Element, entity: &Entity) {
        root.set_attr(self.attr, entity.uri());
    }
}

/// Whole-list access to repeated entity references.
#[derive(Debug, Clone)]
pub struct EntityListDescriptor {
    tag: QName,
    kind: EntityKind,
    nesting: Path,
}

impl EntityListDescriptor {
    pub fn new(tag: &str, kind: EntityKind) -> Self {
        Self::nested(tag, kind, &[])
    }

    pub fn nested(tag: &str, kind: EntityKind, nested: &[&str]) -> Self {
        Self {
            tag: QName::local(tag),
            kind,
            nesting: nesting(nested),
        }
    }

    pub fn get(&self, root: &Element, cache: &dyn IdentityCache) -> Result<Vec<EntityRef>> {
        let Some(container) = lookup(root, &self.nesting) else {
            return Ok(Vec::new());
        };
        let codec = EntityItem {
            tag: self.tag.clone(),
            kind: self.kind,
            cache,
        };
        container
            .find_all(&self.tag)
            .map(|node| codec.decode(node))
            .collect()
    }

    /// Replace the referenced entities, leaving other children alone.
    pub fn set<'c>(
        &self,
        root: &mut Element,
        cache: &'c dyn IdentityCache,
        entities: impl IntoIterator<Item = EntityRef>,
    ) -> Result<()> {
        let codec = EntityItem {
            tag: self.tag.clone(),
            kind: self.kind,
            cache,
        };
        let mut list: EntityList<'_, 'c> = EntityList::with_codec(root, codec, self.nesting.clone())?;
        list.replace_all(entities)
    }
}

/// `(container, coordinate)` stored in a `<location>` child.
#[derive(Debug, Clone)]
pub struct LocationDescriptor {
    path: Path,
}

impl Default for LocationDescriptor {
    fn default() -> Self {
        Self::nested(&[])
    }
}

impl LocationDescriptor {
    pub fn nested(nested: &[&str]) -> Self {
        let mut path = nesting(nested);
        path.push(QName::local("location"));
        Self { path }
    }

    pub fn get(
        &self,
        root: &Element,
        cache: &dyn IdentityCache,
    ) -> Result<Option<(EntityRef, String)>> {
        lookup(root, &self.path)
            .map(|location| read_location(location, cache))
            .transpose()
    }

    pub fn set(&self, root: &mut Element, container: &Entity, value: &str) {
        write_location(resolve(root, &self.path), container, value);
    }
}
