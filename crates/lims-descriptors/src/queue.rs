//! Read-only list of artifacts waiting in a queue.

use std::ops::Index;

use chrono::{DateTime, FixedOffset};
use lims_xml::path::nesting;
use lims_xml::{lookup, Element, QName};

use crate::entity::{EntityKind, EntityRef, IdentityCache};
use crate::reference::{read_location, read_uri};
use crate::{BindError, Result};

/// An artifact, when it entered the queue, and where it sits.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedArtifact {
    pub artifact: EntityRef,
    pub queue_time: DateTime<FixedOffset>,
    pub location: (EntityRef, String),
}

/// Decoded from `<artifacts><artifact uri>` children. Queues are managed by
/// the server, so every mutation is refused.
#[derive(Debug, Clone, Default)]
pub struct QueuedArtifactList {
    items: Vec<QueuedArtifact>,
}

impl QueuedArtifactList {
    pub fn new(root: &Element, cache: &dyn IdentityCache) -> Result<Self> {
        let Some(container) = lookup(root, &nesting(&["artifacts"])) else {
            return Ok(Self::default());
        };
        let items = container
            .find_all(&QName::local("artifact"))
            .map(|node| decode(node, cache))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QueuedArtifact> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueuedArtifact> {
        self.items.iter()
    }

    pub fn append(&mut self, _item: QueuedArtifact) -> Result<()> {
        Err(BindError::NotSupported("append to a queued artifact list"))
    }

    pub fn insert(&mut self, _index: usize, _item: QueuedArtifact) -> Result<()> {
        Err(BindError::NotSupported("insert into a queued artifact list"))
    }

    pub fn set(&mut self, _index: usize, _item: QueuedArtifact) -> Result<()> {
        Err(BindError::NotSupported("set in a queued artifact list"))
    }

    pub fn clear(&mut self) -> Result<()> {
        Err(BindError::NotSupported("clear a queued artifact list"))
    }
}

impl Index<usize> for QueuedArtifactList {
    type Output = QueuedArtifact;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'l> IntoIterator for &'l QueuedArtifactList {
    type Item = &'l QueuedArtifact;
    type IntoIter = std::slice::Iter<'l, QueuedArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn decode(node: &Element, cache: &dyn IdentityCache) -> Result<QueuedArtifact> {
    let artifact = read_uri(node, "uri", EntityKind::Artifact, cache)?;
    let raw = node
        .find(&QName::local("queue-time"))
        .and_then(Element::text)
        .ok_or_else(|| BindError::MissingElement("queue-time".to_owned()))?;
    let queue_time =
        DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| BindError::MalformedValue {
            expected: "RFC 3339 timestamp",
            value: raw.to_owned(),
        })?;
    let location = node
        .find(&QName::local("location"))
        .ok_or_else(|| BindError::MissingElement("location".to_owned()))?;
    Ok(QueuedArtifact {
        artifact,
        queue_time,
        location: read_location(location, cache)?,
    })
}
