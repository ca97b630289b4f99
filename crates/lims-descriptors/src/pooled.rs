//! Pool name → (output, inputs) over `<pooled-inputs><pool>` nodes.

use lims_xml::path::nesting;
use lims_xml::{lookup, lookup_mut, resolve, Element, Path, QName};
use tracing::debug;

use crate::elems::{remove_children, KeyedElems};
use crate::entity::{EntityKind, EntityRef, IdentityCache};
use crate::reference::read_uri;
use crate::{BindError, Result};

/// One pool: the artifact it produces and the artifacts that went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub output: EntityRef,
    pub inputs: Vec<EntityRef>,
}

impl Pool {
    pub fn new(output: EntityRef, inputs: impl IntoIterator<Item = EntityRef>) -> Self {
        Self {
            output,
            inputs: inputs.into_iter().collect(),
        }
    }
}

/// ```
/// use lims_descriptors::{EntityKind, PooledInputDict, Pool, Session};
/// use lims_xml::Element;
///
/// let session = Session::new("http://lims");
/// let mut root = Element::new("step-pools");
/// let mut pools = PooledInputDict::new(&mut root, &session).unwrap();
/// let out = session.entity(EntityKind::Artifact, "2-1");
/// let inputs = ["1-1", "1-2"].map(|id| session.entity(EntityKind::Artifact, id));
/// pools.set("pool1", &Pool::new(out, inputs));
/// assert_eq!(pools.get("pool1").unwrap().inputs.len(), 2);
/// ```
pub struct PooledInputDict<'a, 'c> {
    root: &'a mut Element,
    nesting: Path,
    cache: &'c dyn IdentityCache,
    pools: KeyedElems,
}

const POOL: &str = "pool";
const INPUT: &str = "input";

impl<'a, 'c> PooledInputDict<'a, 'c> {
    /// Every pool node must carry a `name`; a pool without one is an error.
    pub fn new(root: &'a mut Element, cache: &'c dyn IdentityCache) -> Result<Self> {
        let nesting = nesting(&["pooled-inputs"]);
        let tag = QName::local(POOL);
        let pools = match lookup(root, &nesting) {
            Some(container) => {
                if let Some(unnamed) = container
                    .find_all(&tag)
                    .find(|pool| pool.attr("name").is_none())
                {
                    return Err(BindError::MissingAttribute {
                        element: unnamed.name.to_string(),
                        attr: "name",
                    });
                }
                KeyedElems::scan(
                    container,
                    |child| child.name == tag,
                    |child| child.attr("name").map(str::to_owned),
                )
            }
            None => KeyedElems::default(),
        };
        Ok(Self {
            root,
            nesting,
            cache,
            pools,
        })
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.len() == 0
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.pools.contains(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.pools.keys()
    }

    pub fn get(&self, name: &str) -> Result<Pool> {
        let node = self
            .pools
            .get(name)
            .and_then(|pos| lookup(&*self.root, &self.nesting)?.child(pos))
            .ok_or_else(|| BindError::MissingKey(name.to_owned()))?;
        let output = read_uri(node, "output-uri", EntityKind::Artifact, self.cache)?;
        let inputs = node
            .find_all(&QName::local(INPUT))
            .map(|input| read_uri(input, "uri", EntityKind::Artifact, self.cache))
            .collect::<Result<Vec<_>>>()?;
        Ok(Pool { output, inputs })
    }

    pub fn items(&self) -> Result<Vec<(String, Pool)>> {
        self.pools
            .keys()
            .map(|name| Ok((name.to_owned(), self.get(name)?)))
            .collect()
    }

    /// Write `pool` under `name`. An existing pool node is rewritten in place,
    /// keeping its position; a new name appends a pool node.
    pub fn set(&mut self, name: &str, pool: &Pool) {
        let container = resolve(self.root, &self.nesting);
        match self.pools.get(name).and_then(|pos| container.child_mut(pos)) {
            Some(node) => {
                let input = QName::local(INPUT);
                node.retain_children(|child| child.name != input);
                write_pool(node, pool);
            }
            None => {
                let mut node = Element::new(POOL)
                    .with_attr("output-uri", pool.output.uri())
                    .with_attr("name", name);
                write_pool(&mut node, pool);
                let pos = container.push(node);
                debug!(%name, inputs = pool.inputs.len(), pos, "added pool");
                self.pools.push(name.to_owned(), pos);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        let positions = self
            .pools
            .remove(name)
            .ok_or_else(|| BindError::MissingKey(name.to_owned()))?;
        if let Some(container) = lookup_mut(self.root, &self.nesting) {
            remove_children(container, &positions);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        let positions = self.pools.drain_descending();
        if let Some(container) = lookup_mut(self.root, &self.nesting) {
            remove_children(container, &positions);
        }
    }
}

fn write_pool(node: &mut Element, pool: &Pool) {
    node.set_attr("output-uri", pool.output.uri());
    for input in &pool.inputs {
        node.push(Element::new(INPUT).with_attr("uri", input.uri()));
    }
}
