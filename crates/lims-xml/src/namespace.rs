//! The LIMS protocol's fixed prefix → namespace table.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{QName, XmlError};

/// User-defined field namespace (`udf:`).
pub const UDF: &str = "http://genologics.com/ri/userdefined";
/// Root resource-interface namespace (`ri:`).
pub const RI: &str = "http://genologics.com/ri";

const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("art", "http://genologics.com/ri/artifact"),
    ("artgr", "http://genologics.com/ri/artifactgroup"),
    ("cnf", "http://genologics.com/ri/configuration"),
    ("con", "http://genologics.com/ri/container"),
    ("ctp", "http://genologics.com/ri/containertype"),
    ("exc", "http://genologics.com/ri/exception"),
    ("file", "http://genologics.com/ri/file"),
    ("inst", "http://genologics.com/ri/instrument"),
    ("kit", "http://genologics.com/ri/reagentkit"),
    ("lab", "http://genologics.com/ri/lab"),
    ("lot", "http://genologics.com/ri/reagentlot"),
    ("prc", "http://genologics.com/ri/process"),
    ("prj", "http://genologics.com/ri/project"),
    ("prop", "http://genologics.com/ri/property"),
    ("protcnf", "http://genologics.com/ri/protocolconfiguration"),
    ("protstepcnf", "http://genologics.com/ri/stepconfiguration"),
    ("prx", "http://genologics.com/ri/processexecution"),
    ("ptm", "http://genologics.com/ri/processtemplate"),
    ("ptp", "http://genologics.com/ri/processtype"),
    ("res", "http://genologics.com/ri/researcher"),
    ("ri", RI),
    ("rt", "http://genologics.com/ri/routing"),
    ("rtp", "http://genologics.com/ri/reagenttype"),
    ("smp", "http://genologics.com/ri/sample"),
    ("stg", "http://genologics.com/ri/stage"),
    ("stp", "http://genologics.com/ri/step"),
    ("udf", UDF),
    ("ver", "http://genologics.com/ri/version"),
    ("wkfcnf", "http://genologics.com/ri/workflowconfiguration"),
];

/// Prefix → namespace URI mapping used to qualify tag names and to pick
/// prefixes when serializing.
///
/// Loadable from TOML; entries given in configuration are layered over the
/// built-in protocol table:
///
/// ```
/// use lims_xml::NamespaceMap;
///
/// let map = NamespaceMap::from_toml_str(r#"
/// [namespaces]
/// custom = "http://example.com/custom"
/// "#).unwrap();
/// assert_eq!(map.uri("custom"), Some("http://example.com/custom"));
/// assert_eq!(map.uri("udf"), Some("http://genologics.com/ri/userdefined"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceMap {
    prefixes: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct NamespaceConfig {
    #[serde(default)]
    namespaces: IndexMap<String, String>,
}

impl Default for NamespaceMap {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES
                .iter()
                .map(|(p, u)| ((*p).to_owned(), (*u).to_owned()))
                .collect(),
        }
    }
}

impl NamespaceMap {
    /// A map with no prefixes at all.
    pub fn empty() -> Self {
        Self {
            prefixes: IndexMap::new(),
        }
    }

    pub fn from_toml_str(src: &str) -> Result<Self, XmlError> {
        let cfg: NamespaceConfig =
            toml::from_str(src).map_err(|e| XmlError::Config(e.to_string()))?;
        let mut map = Self::default();
        for (prefix, uri) in cfg.namespaces {
            map.insert(prefix, uri);
        }
        Ok(map)
    }

    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), uri.into());
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// First prefix registered for `uri`.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, u)| u.as_str() == uri)
            .map(|(p, _)| p.as_str())
    }

    /// Turn a prefixed tag such as `udf:field` into a [`QName`].
    ///
    /// ```
    /// use lims_xml::{NamespaceMap, QName, XmlError};
    ///
    /// let ns = NamespaceMap::default();
    /// assert_eq!(
    ///     ns.qualify("ri:externalid").unwrap(),
    ///     QName::new("http://genologics.com/ri", "externalid"),
    /// );
    /// assert!(matches!(ns.qualify("field"), Err(XmlError::MissingPrefix(_))));
    /// assert!(matches!(ns.qualify("zz:field"), Err(XmlError::UnknownPrefix(_))));
    /// ```
    pub fn qualify(&self, tag: &str) -> Result<QName, XmlError> {
        let (prefix, local) = tag
            .split_once(':')
            .ok_or_else(|| XmlError::MissingPrefix(tag.to_owned()))?;
        if local.contains(':') {
            return Err(XmlError::MissingPrefix(tag.to_owned()));
        }
        let uri = self
            .uri(prefix)
            .ok_or_else(|| XmlError::UnknownPrefix(prefix.to_owned()))?;
        Ok(QName::new(uri, local))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }
}
