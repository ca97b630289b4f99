//! Entity references and the session-scoped identity cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{BindError, Result};

/// The kinds of LIMS resources a binding can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Artifact,
    Container,
    File,
    Lab,
    Process,
    Project,
    ProtocolStep,
    ReagentType,
    Researcher,
    Sample,
    Step,
}

impl EntityKind {
    /// REST collection segment under `/api/{version}/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            EntityKind::Artifact => "artifacts",
            EntityKind::Container => "containers",
            EntityKind::File => "files",
            EntityKind::Lab => "labs",
            EntityKind::Process => "processes",
            EntityKind::Project => "projects",
            EntityKind::ProtocolStep => "steps",
            EntityKind::ReagentType => "reagenttypes",
            EntityKind::Researcher => "researchers",
            EntityKind::Sample => "samples",
            EntityKind::Step => "steps",
        }
    }
}

/// A resource identified by its URI. The resource's own document is owned by
/// the host session, not by this handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    kind: EntityKind,
    uri: String,
}

impl Entity {
    pub fn new(kind: EntityKind, uri: impl Into<String>) -> Self {
        Self {
            kind,
            uri: uri.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// LIMS id: the last non-empty segment of the URI, query string removed.
    ///
    /// ```
    /// use lims_descriptors::{Entity, EntityKind};
    ///
    /// let e = Entity::new(EntityKind::Artifact, "http://lims/api/v2/artifacts/a1?state=2");
    /// assert_eq!(e.id(), "a1");
    /// ```
    pub fn id(&self) -> &str {
        let path = self.uri.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.uri)
    }
}

/// Shared handle to a cached entity.
pub type EntityRef = Rc<Entity>;

/// Host-side table guaranteeing one live entity per URI.
///
/// Bindings only ever call [`IdentityCache::resolve`]; they never evict or
/// replace entries.
pub trait IdentityCache {
    fn resolve(&self, kind: EntityKind, uri: &str) -> EntityRef;
}

fn default_api_version() -> String {
    "v2".to_owned()
}

/// Connection-level settings a [`Session`] needs to build entity URIs.
///
/// ```
/// use lims_descriptors::SessionConfig;
///
/// let cfg = SessionConfig::from_toml_str(r#"base_uri = "http://lims:4040""#).unwrap();
/// assert_eq!(cfg.api_version, "v2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    pub base_uri: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl SessionConfig {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            api_version: default_api_version(),
        }
    }

    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).map_err(|e| BindError::Config(e.to_string()))
    }
}

/// Default in-memory identity cache keyed by URI.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    cache: RefCell<HashMap<String, EntityRef>>,
}

impl Session {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self::from_config(SessionConfig::new(base_uri))
    }

    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// `{base}/api/{version}/{endpoint}/{id}`
    pub fn entity_uri(&self, kind: EntityKind, id: &str) -> String {
        format!(
            "{}/api/{}/{}/{}",
            self.config.base_uri.trim_end_matches('/'),
            self.config.api_version,
            kind.endpoint(),
            id
        )
    }

    /// Cached entity for a LIMS id.
    pub fn entity(&self, kind: EntityKind, id: &str) -> EntityRef {
        self.resolve(kind, &self.entity_uri(kind, id))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl IdentityCache for Session {
    /// A URI keeps the kind it was first resolved with; asking for another
    /// kind returns the cached entity and logs a warning.
    fn resolve(&self, kind: EntityKind, uri: &str) -> EntityRef {
        let mut cache = self.cache.borrow_mut();
        if let Some(existing) = cache.get(uri) {
            if existing.kind() != kind {
                warn!(%uri, cached = ?existing.kind(), requested = ?kind, "uri already cached with another kind");
            }
            return Rc::clone(existing);
        }
        debug!(%uri, ?kind, "caching new entity");
        let entity = Rc::new(Entity::new(kind, uri));
        cache.insert(uri.to_owned(), Rc::clone(&entity));
        entity
    }
}
