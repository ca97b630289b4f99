//! Qualified element names.

use std::fmt;

/// An element or attribute name, optionally bound to a namespace URI.
///
/// Equality compares the namespace URI and local part, never a prefix: the
/// prefix is a property of a serialized document, not of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    /// A name without namespace, e.g. `placement`.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// A name in the namespace identified by `uri`.
    pub fn new(uri: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(uri.into()),
            local: local.into(),
        }
    }

    /// Parse Clark notation (`{uri}local`), falling back to a local name.
    ///
    /// ```
    /// use lims_xml::QName;
    ///
    /// let q = QName::from_clark("{http://genologics.com/ri}externalid");
    /// assert_eq!(q.namespace.as_deref(), Some("http://genologics.com/ri"));
    /// assert_eq!(q.local, "externalid");
    /// assert_eq!(QName::from_clark("value"), QName::local("value"));
    /// ```
    pub fn from_clark(s: &str) -> Self {
        if let Some(rest) = s.strip_prefix('{') {
            if let Some((uri, local)) = rest.split_once('}') {
                return Self::new(uri, local);
            }
        }
        Self::local(s)
    }

    pub fn is_namespaced(&self) -> bool {
        self.namespace.is_some()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(uri) => write!(f, "{{{}}}{}", uri, self.local),
            None => f.write_str(&self.local),
        }
    }
}

impl From<&str> for QName {
    fn from(s: &str) -> Self {
        QName::from_clark(s)
    }
}
