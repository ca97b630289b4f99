//! Next-action element: a closed set of keys over one node's attributes.

use std::fmt;
use std::str::FromStr;

use lims_xml::{resolve, Element, QName};

use crate::entity::{Entity, EntityKind, EntityRef, IdentityCache};
use crate::{BindError, Result};

/// Keys an action exposes, and the attribute each one lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKey {
    Action,
    Step,
    Artifact,
}

impl ActionKey {
    pub const ALL: [ActionKey; 3] = [ActionKey::Action, ActionKey::Step, ActionKey::Artifact];

    pub fn attribute(self) -> &'static str {
        match self {
            ActionKey::Action => "action",
            ActionKey::Step => "step-uri",
            ActionKey::Artifact => "artifact-uri",
        }
    }

    /// Entity kind behind a URI-valued key; `None` for plain text.
    fn entity_kind(self) -> Option<EntityKind> {
        match self {
            ActionKey::Action => None,
            ActionKey::Step => Some(EntityKind::ProtocolStep),
            ActionKey::Artifact => Some(EntityKind::Artifact),
        }
    }
}

impl FromStr for ActionKey {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "action" => Ok(ActionKey::Action),
            "step" => Ok(ActionKey::Step),
            "artifact" => Ok(ActionKey::Artifact),
            _ => Err(BindError::MissingKey(s.to_owned())),
        }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKey::Action => "action",
            ActionKey::Step => "step",
            ActionKey::Artifact => "artifact",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionValue {
    Text(String),
    Entity(EntityRef),
}

impl From<&str> for ActionValue {
    fn from(s: &str) -> Self {
        ActionValue::Text(s.to_owned())
    }
}

impl From<EntityRef> for ActionValue {
    fn from(e: EntityRef) -> Self {
        ActionValue::Entity(e)
    }
}

impl From<&EntityRef> for ActionValue {
    fn from(e: &EntityRef) -> Self {
        ActionValue::Entity(EntityRef::clone(e))
    }
}

/// Mapping view over the first `tag` child of the root, e.g. `next-action`.
///
/// Reads never create the element; the first write does.
pub struct XmlAction<'a, 'c> {
    root: &'a mut Element,
    tag: QName,
    cache: &'c dyn IdentityCache,
}

impl<'a, 'c> XmlAction<'a, 'c> {
    pub fn new(root: &'a mut Element, cache: &'c dyn IdentityCache, tag: &str) -> Self {
        Self {
            root,
            tag: QName::local(tag),
            cache,
        }
    }

    fn node(&self) -> Option<&Element> {
        self.root.find(&self.tag)
    }

    fn node_mut(&mut self) -> &mut Element {
        resolve(self.root, std::slice::from_ref(&self.tag))
    }

    /// `Ok(None)` when the attribute is absent. `key` must be one of
    /// `action`, `step`, `artifact`.
    pub fn get(&self, key: &str) -> Result<Option<ActionValue>> {
        self.get_key(key.parse()?)
    }

    pub fn get_key(&self, key: ActionKey) -> Result<Option<ActionValue>> {
        let Some(raw) = self.node().and_then(|n| n.attr(key.attribute())) else {
            return Ok(None);
        };
        Ok(Some(match key.entity_kind() {
            Some(kind) => ActionValue::Entity(self.cache.resolve(kind, raw)),
            None => ActionValue::Text(raw.to_owned()),
        }))
    }

    pub fn set(&mut self, key: &str, value: impl Into<ActionValue>) -> Result<()> {
        self.set_key(key.parse()?, value)
    }

    /// Text goes to `action`; entities go to the URI keys. Any other pairing
    /// is rejected before the tree is touched.
    pub fn set_key(&mut self, key: ActionKey, value: impl Into<ActionValue>) -> Result<()> {
        let raw = match (key.entity_kind(), value.into()) {
            (None, ActionValue::Text(text)) => text,
            (Some(_), ActionValue::Entity(entity)) => entity.uri().to_owned(),
            (kind, given) => {
                return Err(BindError::TypeMismatch {
                    field: key.to_string(),
                    declared: if kind.is_some() { "entity" } else { "text" }.to_owned(),
                    given: match given {
                        ActionValue::Text(_) => "text",
                        ActionValue::Entity(_) => "entity",
                    },
                })
            }
        };
        self.node_mut().set_attr(key.attribute(), raw);
        Ok(())
    }

    /// Drop the attribute behind `key`, returning its raw text.
    pub fn remove(&mut self, key: &str) -> Result<String> {
        let key: ActionKey = key.parse()?;
        self.root
            .find_mut(&self.tag)
            .and_then(|n| n.remove_attr(key.attribute()))
            .ok_or_else(|| BindError::MissingKey(key.to_string()))
    }

    /// Keys whose attribute is present, in declaration order.
    pub fn keys(&self) -> Vec<ActionKey> {
        ActionKey::ALL
            .into_iter()
            .filter(|k| self.node().is_some_and(|n| n.attr(k.attribute()).is_some()))
            .collect()
    }

    pub fn action(&self) -> Option<&str> {
        self.node().and_then(|n| n.attr(ActionKey::Action.attribute()))
    }

    pub fn step(&self) -> Option<EntityRef> {
        self.entity(ActionKey::Step)
    }

    pub fn artifact(&self) -> Option<EntityRef> {
        self.entity(ActionKey::Artifact)
    }

    fn entity(&self, key: ActionKey) -> Option<EntityRef> {
        let kind = key.entity_kind()?;
        let uri = self.node()?.attr(key.attribute())?;
        Some(self.cache.resolve(kind, uri))
    }

    pub fn set_action(&mut self, action: &str) {
        self.node_mut().set_attr(ActionKey::Action.attribute(), action);
    }

    pub fn set_step(&mut self, step: &Entity) {
        self.node_mut().set_attr(ActionKey::Step.attribute(), step.uri());
    }

    pub fn set_artifact(&mut self, artifact: &Entity) {
        self.node_mut()
            .set_attr(ActionKey::Artifact.attribute(), artifact.uri());
    }
}
