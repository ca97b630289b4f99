//! Sequence bindings over repeated sibling elements.
//!
//! An [`XmlList`] is an ordered, index-addressable view of every child with
//! one tag name under a (possibly nested) container. The item type and its
//! mapping onto a node come from an [`ItemCodec`]; the aliases at the bottom
//! of this module cover the shapes the LIMS documents use.

use std::ops::{Index, Range};

use indexmap::IndexMap;
use lims_xml::namespace::RI;
use lims_xml::path::nesting;
use lims_xml::{lookup, lookup_mut, resolve, Attributes, Element, Path, QName};
use tracing::debug;

use crate::elems::ElemIndex;
use crate::entity::{EntityKind, EntityRef, IdentityCache};
use crate::reference::{read_location, read_uri, write_location};
use crate::{BindError, Result};

/// How one logical item maps onto one node.
pub trait ItemCodec {
    type Item: Clone;

    /// Tag shared by every node of the sequence.
    fn tag(&self) -> &QName;

    fn decode(&self, node: &Element) -> Result<Self::Item>;

    /// Write `item` into `node`, a freshly created element tagged `tag()`.
    fn encode(&self, node: &mut Element, item: &Self::Item);
}

/// Mutable sequence view over the `codec.tag()` children of one container.
///
/// Items are decoded once, on construction. Every mutation updates the tree
/// and the decoded items together; index checks happen before any node is
/// touched, so a failed call leaves both as they were. Nodes with other tags
/// in the same container are never moved or removed.
pub struct XmlList<'a, C: ItemCodec> {
    root: &'a mut Element,
    nesting: Path,
    codec: C,
    items: Vec<C::Item>,
    elems: ElemIndex,
}

impl<'a, C: ItemCodec> XmlList<'a, C> {
    pub fn with_codec(root: &'a mut Element, codec: C, nesting: Path) -> Result<Self> {
        let (items, elems) = match lookup(root, &nesting) {
            Some(container) => {
                let elems = ElemIndex::scan(container, codec.tag());
                let items = elems
                    .iter()
                    .map(|pos| codec.decode(&container.children()[pos]))
                    .collect::<Result<Vec<_>>>()?;
                (items, elems)
            }
            None => (Vec::new(), ElemIndex::default()),
        };
        Ok(Self {
            root,
            nesting,
            codec,
            items,
            elems,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&C::Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, C::Item> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[C::Item] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<C::Item> {
        self.items.clone()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(BindError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    /// Replace the item at `index` with a freshly written node at the same
    /// child position.
    pub fn set(&mut self, index: usize, item: C::Item) -> Result<()> {
        self.check_index(index)?;
        let pos = self.elems.get(index).unwrap_or_default();
        let mut fresh = Element::new(self.codec.tag().clone());
        self.codec.encode(&mut fresh, &item);
        let container = resolve(self.root, &self.nesting);
        let node = container
            .child_mut(pos)
            .ok_or_else(|| BindError::MissingElement(self.codec.tag().to_string()))?;
        // the old node's attributes and children go with it
        *node = fresh;
        self.items[index] = item;
        Ok(())
    }

    /// Insert before the item at `index`; an index at or past the end appends.
    pub fn insert(&mut self, index: usize, item: C::Item) {
        let index = index.min(self.items.len());
        let mut node = Element::new(self.codec.tag().clone());
        self.codec.encode(&mut node, &item);
        let container = resolve(self.root, &self.nesting);
        let slot = self.elems.slot(index, container.child_count());
        let pos = container.insert_child(slot, node);
        debug!(tag = %self.codec.tag(), index, pos, "inserted sequence node");
        self.elems.insert(index, pos);
        self.items.insert(index, item);
    }

    pub fn append(&mut self, item: C::Item) {
        self.insert(self.items.len(), item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = C::Item>) {
        for item in items {
            self.append(item);
        }
    }

    /// Remove the item at `index` together with its node.
    pub fn remove(&mut self, index: usize) -> Result<C::Item> {
        self.check_index(index)?;
        let pos = self.elems.remove(index);
        if let Some(container) = lookup_mut(self.root, &self.nesting) {
            container.remove_child(pos);
        }
        debug!(tag = %self.codec.tag(), index, pos, "removed sequence node");
        Ok(self.items.remove(index))
    }

    /// Replace `range` with `items`; the two need not be the same length.
    ///
    /// Overlapping positions are rewritten in place, surplus old nodes are
    /// removed and surplus new items are inserted where the range ended.
    pub fn set_range(
        &mut self,
        range: Range<usize>,
        items: impl IntoIterator<Item = C::Item>,
    ) -> Result<()> {
        if range.start > range.end || range.end > self.items.len() {
            return Err(BindError::IndexOutOfRange {
                index: range.end.max(range.start),
                len: self.items.len(),
            });
        }
        let new: Vec<C::Item> = items.into_iter().collect();
        let overlap = range.len().min(new.len());
        let mut new = new.into_iter();
        for index in range.start..range.start + overlap {
            if let Some(item) = new.next() {
                self.set(index, item)?;
            }
        }
        for index in (range.start + overlap..range.end).rev() {
            self.remove(index)?;
        }
        for (offset, item) in new.enumerate() {
            self.insert(range.start + overlap + offset, item);
        }
        Ok(())
    }

    /// Replace the whole sequence.
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = C::Item>) -> Result<()> {
        self.set_range(0..self.items.len(), items)
    }

    /// Remove every item and its node, leaving other children alone.
    pub fn clear(&mut self) {
        let positions = self.elems.drain_descending();
        if let Some(container) = lookup_mut(self.root, &self.nesting) {
            for pos in &positions {
                container.remove_child(*pos);
            }
        }
        debug!(tag = %self.codec.tag(), removed = positions.len(), "cleared sequence");
        self.items.clear();
    }
}

impl<C: ItemCodec> Index<usize> for XmlList<'_, C> {
    type Output = C::Item;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'l, C: ItemCodec> IntoIterator for &'l XmlList<'_, C> {
    type Item = &'l C::Item;
    type IntoIter = std::slice::Iter<'l, C::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ── Codecs ─────────────────────────────────────────────────────────────────

/// Element text, e.g. repeated well positions.
pub struct TextItem {
    tag: QName,
}

impl ItemCodec for TextItem {
    type Item = String;

    fn tag(&self) -> &QName {
        &self.tag
    }

    fn decode(&self, node: &Element) -> Result<String> {
        Ok(node.text().unwrap_or_default().to_owned())
    }

    fn encode(&self, node: &mut Element, item: &String) {
        node.set_text(item.as_str());
    }
}

/// `uri` attribute resolved through the identity cache.
pub struct EntityItem<'c> {
    pub(crate) tag: QName,
    pub(crate) kind: EntityKind,
    pub(crate) cache: &'c dyn IdentityCache,
}

impl ItemCodec for EntityItem<'_> {
    type Item = EntityRef;

    fn tag(&self) -> &QName {
        &self.tag
    }

    fn decode(&self, node: &Element) -> Result<EntityRef> {
        read_uri(node, "uri", self.kind, self.cache)
    }

    fn encode(&self, node: &mut Element, item: &EntityRef) {
        node.set_attr("uri", item.uri());
    }
}

/// Whole attribute table of a node.
pub struct AttributeItem {
    tag: QName,
}

impl ItemCodec for AttributeItem {
    type Item = Attributes;

    fn tag(&self) -> &QName {
        &self.tag
    }

    fn decode(&self, node: &Element) -> Result<Attributes> {
        Ok(node.attributes().clone())
    }

    fn encode(&self, node: &mut Element, item: &Attributes) {
        *node.attributes_mut() = item.clone();
    }
}

/// `<reagent-label name="..."/>` exposed as the bare name.
pub struct ReagentLabelItem {
    tag: QName,
}

impl ItemCodec for ReagentLabelItem {
    type Item = String;

    fn tag(&self) -> &QName {
        &self.tag
    }

    fn decode(&self, node: &Element) -> Result<String> {
        node.attr("name")
            .map(str::to_owned)
            .ok_or_else(|| BindError::MissingAttribute {
                element: self.tag.to_string(),
                attr: "name",
            })
    }

    fn encode(&self, node: &mut Element, item: &String) {
        node.set_attr("name", item.as_str());
    }
}

/// `(id, uri)` pair of an `ri:externalid` node.
pub struct ExternalIdItem {
    tag: QName,
}

impl ItemCodec for ExternalIdItem {
    type Item = (String, String);

    fn tag(&self) -> &QName {
        &self.tag
    }

    fn decode(&self, node: &Element) -> Result<(String, String)> {
        let get = |attr: &'static str| {
            node.attr(attr)
                .map(str::to_owned)
                .ok_or_else(|| BindError::MissingAttribute {
                    element: self.tag.to_string(),
                    attr,
                })
        };
        Ok((get("id")?, get("uri")?))
    }

    fn encode(&self, node: &mut Element, (id, uri): &(String, String)) {
        node.set_attr("id", id.as_str());
        node.set_attr("uri", uri.as_str());
    }
}

/// Artifact placed at a container coordinate.
pub type OutputPlacement = (EntityRef, (EntityRef, String));

/// `<output-placement uri><location><container uri/><value/></location>`.
pub struct OutputPlacementItem<'c> {
    tag: QName,
    cache: &'c dyn IdentityCache,
}

impl ItemCodec for OutputPlacementItem<'_> {
    type Item = OutputPlacement;

    fn tag(&self) -> &QName {
        &self.tag
    }

    fn decode(&self, node: &Element) -> Result<OutputPlacement> {
        let artifact = read_uri(node, "uri", EntityKind::Artifact, self.cache)?;
        let location = node
            .find(&QName::local("location"))
            .ok_or_else(|| BindError::MissingElement("location".to_owned()))?;
        Ok((artifact, read_location(location, self.cache)?))
    }

    fn encode(&self, node: &mut Element, (artifact, (container, value)): &OutputPlacement) {
        node.set_attr("uri", artifact.uri());
        let location = resolve(node, &nesting(&["location"]));
        write_location(location, container, value);
    }
}

// ── Concrete lists ─────────────────────────────────────────────────────────

pub type StringList<'a> = XmlList<'a, TextItem>;
pub type EntityList<'a, 'c> = XmlList<'a, EntityItem<'c>>;
pub type AttributeList<'a> = XmlList<'a, AttributeItem>;
pub type ReagentLabelList<'a> = XmlList<'a, ReagentLabelItem>;
pub type ExternalIdList<'a> = XmlList<'a, ExternalIdItem>;
pub type OutputPlacementList<'a, 'c> = XmlList<'a, OutputPlacementItem<'c>>;

impl<'a> XmlList<'a, TextItem> {
    pub fn new(root: &'a mut Element, tag: &str, nested: &[&str]) -> Result<Self> {
        Self::with_codec(root, TextItem { tag: QName::local(tag) }, nesting(nested))
    }
}

impl<'a, 'c> XmlList<'a, EntityItem<'c>> {
    pub fn new(
        root: &'a mut Element,
        cache: &'c dyn IdentityCache,
        tag: &str,
        kind: EntityKind,
        nested: &[&str],
    ) -> Result<Self> {
        let codec = EntityItem {
            tag: QName::local(tag),
            kind,
            cache,
        };
        Self::with_codec(root, codec, nesting(nested))
    }
}

impl<'a> XmlList<'a, AttributeItem> {
    pub fn new(root: &'a mut Element, tag: &str, nested: &[&str]) -> Result<Self> {
        Self::with_codec(root, AttributeItem { tag: QName::local(tag) }, nesting(nested))
    }

    /// Append a node carrying exactly `attrs`.
    pub fn append_attrs<K, V>(&mut self, attrs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let attrs: IndexMap<String, String> =
            attrs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.append(attrs);
    }
}

impl<'a> XmlList<'a, ReagentLabelItem> {
    pub fn new(root: &'a mut Element, nested: &[&str]) -> Result<Self> {
        let codec = ReagentLabelItem {
            tag: QName::local("reagent-label"),
        };
        Self::with_codec(root, codec, nesting(nested))
    }
}

impl<'a> XmlList<'a, ExternalIdItem> {
    pub fn new(root: &'a mut Element, nested: &[&str]) -> Result<Self> {
        let codec = ExternalIdItem {
            tag: QName::new(RI, "externalid"),
        };
        Self::with_codec(root, codec, nesting(nested))
    }
}

impl<'a, 'c> XmlList<'a, OutputPlacementItem<'c>> {
    pub fn new(root: &'a mut Element, cache: &'c dyn IdentityCache) -> Result<Self> {
        let codec = OutputPlacementItem {
            tag: QName::local("output-placement"),
            cache,
        };
        Self::with_codec(root, codec, nesting(&["output-placements"]))
    }
}
