//! Owned, mutable XML element tree for LIMS resource documents.
//!
//! Every resource fetched from the LIMS is a single XML document. This crate
//! keeps it as an owned [`Element`] tree that binding code can read and mutate
//! in place, plus the pieces needed to move it over the wire:
//!
//! - [`QName`] and [`NamespaceMap`] for the protocol's fixed namespaces,
//! - [`resolve`] / [`lookup`] for walking a nesting path of container tags,
//! - [`Element::parse`] / [`Element::to_xml`] for text conversion.
//!
//! # Example
//!
//! ```
//! use lims_xml::{resolve, Element, NamespaceMap, Path, QName};
//!
//! let mut root = Element::parse("<sample><name>s1</name></sample>").unwrap();
//! let nesting: Path = vec![QName::local("location")];
//! resolve(&mut root, &nesting).set_text("A:1");
//!
//! assert_eq!(root.find(&QName::local("name")).and_then(|e| e.text()), Some("s1"));
//! assert_eq!(root.count(&QName::local("location")), 1);
//! let out = root.to_xml(&NamespaceMap::default());
//! assert!(out.contains("<location>A:1</location>"));
//! ```

use thiserror::Error;

pub mod element;
pub mod name;
pub mod namespace;
pub mod parse;
pub mod path;
pub mod write;

pub use element::{Attributes, Element};
pub use name::QName;
pub use namespace::NamespaceMap;
pub use path::{lookup, lookup_mut, resolve, Path};

/// Errors produced while converting XML text or qualifying tag names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Parse(String),
    #[error("no namespace specifier in tag: {0}")]
    MissingPrefix(String),
    #[error("unknown namespace prefix: {0}")]
    UnknownPrefix(String),
    #[error("invalid namespace configuration: {0}")]
    Config(String),
}
