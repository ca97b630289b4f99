//! Single-value descriptors bound to one child element or one attribute.
//!
//! A descriptor is declared once per entity type and applied to an instance's
//! root element on every call; it holds no tree state of its own.

use std::fmt::Display;

use indexmap::IndexMap;
use lims_xml::path::nesting;
use lims_xml::{lookup, resolve, Element, Path, QName};

use crate::dict::SubTagDictionary;
use crate::list::StringList;
use crate::{BindError, Result};

/// `nesting.. / tag` of a scalar field.
fn field_path(tag: &str, nested: &[&str]) -> Path {
    let mut path = nesting(nested);
    path.push(QName::local(tag));
    path
}

/// Text of a child element.
#[derive(Debug, Clone)]
pub struct StringDescriptor {
    path: Path,
}

impl StringDescriptor {
    pub fn new(tag: &str) -> Self {
        Self::nested(tag, &[])
    }

    pub fn nested(tag: &str, nested: &[&str]) -> Self {
        Self {
            path: field_path(tag, nested),
        }
    }

    /// `None` when the element is missing or has no text.
    pub fn get(&self, root: &Element) -> Option<String> {
        lookup(root, &self.path)
            .and_then(Element::text)
            .map(str::to_owned)
    }

    pub fn set(&self, root: &mut Element, value: impl Display) {
        resolve(root, &self.path).set_text(value.to_string());
    }
}

/// Decimal integer text of a child element.
#[derive(Debug, Clone)]
pub struct IntegerDescriptor {
    path: Path,
}

impl IntegerDescriptor {
    pub fn new(tag: &str) -> Self {
        Self::nested(tag, &[])
    }

    pub fn nested(tag: &str, nested: &[&str]) -> Self {
        Self {
            path: field_path(tag, nested),
        }
    }

    pub fn get(&self, root: &Element) -> Result<Option<i64>> {
        lookup(root, &self.path)
            .and_then(Element::text)
            .map(parse_integer)
            .transpose()
    }

    pub fn set(&self, root: &mut Element, value: i64) {
        resolve(root, &self.path).set_text(value.to_string());
    }
}

pub(crate) fn parse_integer(text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| BindError::MalformedValue {
            expected: "integer",
            value: text.to_owned(),
        })
}

/// Value accepted by [`BooleanDescriptor::set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanInput {
    Bool(bool),
    Literal(String),
}

impl From<bool> for BooleanInput {
    fn from(b: bool) -> Self {
        BooleanInput::Bool(b)
    }
}

impl From<&str> for BooleanInput {
    fn from(s: &str) -> Self {
        BooleanInput::Literal(s.to_owned())
    }
}

/// `true`/`false` text of a child element.
#[derive(Debug, Clone)]
pub struct BooleanDescriptor {
    path: Path,
}

impl BooleanDescriptor {
    pub fn new(tag: &str) -> Self {
        Self::nested(tag, &[])
    }

    pub fn nested(tag: &str, nested: &[&str]) -> Self {
        Self {
            path: field_path(tag, nested),
        }
    }

    /// Only the literal `true` reads as true.
    pub fn get(&self, root: &Element) -> bool {
        lookup(root, &self.path).and_then(Element::text) == Some("true")
    }

    /// Literals other than `"true"` and `"false"` are rejected.
    pub fn set(&self, root: &mut Element, value: impl Into<BooleanInput>) -> Result<()> {
        let literal = match value.into() {
            BooleanInput::Bool(true) => "true",
            BooleanInput::Bool(false) => "false",
            BooleanInput::Literal(s) => match s.as_str() {
                "true" => "true",
                "false" => "false",
                _ => {
                    return Err(BindError::MalformedValue {
                        expected: "boolean",
                        value: s,
                    })
                }
            },
        };
        resolve(root, &self.path).set_text(literal);
        Ok(())
    }
}

/// An attribute of the root element.
#[derive(Debug, Clone)]
pub struct StringAttributeDescriptor {
    attr: String,
}

impl StringAttributeDescriptor {
    pub fn new(attr: impl Into<String>) -> Self {
        Self { attr: attr.into() }
    }

    pub fn get(&self, root: &Element) -> Option<String> {
        root.attr(&self.attr).map(str::to_owned)
    }

    pub fn set(&self, root: &mut Element, value: impl Display) {
        root.set_attr(self.attr.as_str(), value.to_string());
    }
}

/// Whole-list access to the text of repeated elements.
#[derive(Debug, Clone)]
pub struct StringListDescriptor {
    tag: String,
    nesting: Vec<String>,
}

impl StringListDescriptor {
    pub fn new(tag: &str) -> Self {
        Self::nested(tag, &[])
    }

    pub fn nested(tag: &str, nested: &[&str]) -> Self {
        Self {
            tag: tag.to_owned(),
            nesting: nested.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    fn nested_refs(&self) -> Vec<&str> {
        self.nesting.iter().map(String::as_str).collect()
    }

    pub fn get(&self, root: &Element) -> Vec<String> {
        let tag = QName::local(self.tag.as_str());
        lookup(root, &nesting(&self.nested_refs()))
            .map(|container| {
                container
                    .find_all(&tag)
                    .map(|e| e.text().unwrap_or_default().to_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set<S: Into<String>>(
        &self,
        root: &mut Element,
        values: impl IntoIterator<Item = S>,
    ) -> Result<()> {
        let mut list = StringList::new(root, &self.tag, &self.nested_refs())?;
        list.replace_all(values.into_iter().map(Into::into))
    }
}

/// Child tag → text of one container element, as a whole.
#[derive(Debug, Clone)]
pub struct StringDictionaryDescriptor {
    tag: String,
}

impl StringDictionaryDescriptor {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
        }
    }

    /// Empty children map to `None`.
    pub fn get(&self, root: &Element) -> IndexMap<String, Option<String>> {
        lookup(root, &nesting(&[self.tag.as_str()]))
            .map(|container| {
                container
                    .children()
                    .iter()
                    .map(|c| (c.name.to_string(), c.text().map(str::to_owned)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replace the container's children with one element per entry.
    pub fn set<K, V>(&self, root: &mut Element, values: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut dict = SubTagDictionary::new(root, &self.tag, &[]);
        dict.clear();
        for (key, value) in values {
            dict.set(key.as_ref(), value);
        }
    }
}

/// One axis of a container type's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub is_alpha: bool,
    pub offset: i64,
    pub size: i64,
}

/// `<tag><is-alpha/><offset/><size/></tag>`, e.g. `x-dimension`.
#[derive(Debug, Clone)]
pub struct DimensionDescriptor {
    tag: String,
}

impl DimensionDescriptor {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
        }
    }

    pub fn get(&self, root: &Element) -> Result<Option<Dimension>> {
        let tag = self.tag.as_str();
        if lookup(root, &nesting(&[tag])).is_none() {
            return Ok(None);
        }
        let required = |name: &str| -> Result<i64> {
            IntegerDescriptor::nested(name, &[tag])
                .get(root)?
                .ok_or_else(|| BindError::MissingElement(format!("{tag}/{name}")))
        };
        Ok(Some(Dimension {
            is_alpha: BooleanDescriptor::nested("is-alpha", &[tag]).get(root),
            offset: required("offset")?,
            size: required("size")?,
        }))
    }

    pub fn set(&self, root: &mut Element, dim: Dimension) -> Result<()> {
        let tag = self.tag.as_str();
        BooleanDescriptor::nested("is-alpha", &[tag]).set(root, dim.is_alpha)?;
        IntegerDescriptor::nested("offset", &[tag]).set(root, dim.offset);
        IntegerDescriptor::nested("size", &[tag]).set(root, dim.size);
        Ok(())
    }
}
