//! User-defined fields: `<udf:field type=".." name="..">text</udf:field>`.
//!
//! Each field declares its own type. Reads coerce the stored text to that
//! type; writes to an existing field must supply a value of the declared
//! category, and new fields take their type from the value written.

use std::fmt;

use chrono::NaiveDate;
use lims_xml::namespace::UDF;
use lims_xml::path::nesting;
use lims_xml::{lookup, lookup_mut, resolve, Element, Path, QName};
use tracing::debug;

use crate::elems::{remove_children, KeyedElems};
use crate::scalar::parse_integer;
use crate::{BindError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared type of a field, from its `type` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UdfType {
    String,
    Text,
    Numeric,
    Boolean,
    Date,
    Uri,
    /// Any other declared type; stored and read as plain text.
    Other(String),
}

impl UdfType {
    /// Case-insensitive; unknown names are kept as [`UdfType::Other`].
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "string" => UdfType::String,
            "text" => UdfType::Text,
            "numeric" => UdfType::Numeric,
            "boolean" => UdfType::Boolean,
            "date" => UdfType::Date,
            "uri" => UdfType::Uri,
            _ => UdfType::Other(s.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UdfType::String => "String",
            UdfType::Text => "Text",
            UdfType::Numeric => "Numeric",
            UdfType::Boolean => "Boolean",
            UdfType::Date => "Date",
            UdfType::Uri => "URI",
            UdfType::Other(s) => s,
        }
    }

    /// Whether a value of `value`'s category may be stored in a field of
    /// this type. Numeric fields also take an empty string, which clears them.
    pub fn accepts(&self, value: &UdfValue) -> bool {
        match (self, value) {
            (UdfType::Numeric, UdfValue::Integer(_) | UdfValue::Float(_)) => true,
            (UdfType::Numeric, UdfValue::String(s)) => s.is_empty(),
            (UdfType::Boolean, UdfValue::Boolean(_)) => true,
            (UdfType::Date, UdfValue::Date(_)) => true,
            (
                UdfType::String | UdfType::Text | UdfType::Uri | UdfType::Other(_),
                UdfValue::String(_),
            ) => true,
            _ => false,
        }
    }

    fn decode(&self, text: &str) -> Result<UdfValue> {
        match self {
            UdfType::Numeric => match parse_integer(text) {
                Ok(i) => Ok(UdfValue::Integer(i)),
                Err(_) => text
                    .trim()
                    .parse::<f64>()
                    .map(UdfValue::Float)
                    .map_err(|_| BindError::MalformedValue {
                        expected: "numeric",
                        value: text.to_owned(),
                    }),
            },
            UdfType::Boolean => Ok(UdfValue::Boolean(text == "true")),
            UdfType::Date => NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
                .map(UdfValue::Date)
                .map_err(|_| BindError::MalformedValue {
                    expected: "date",
                    value: text.to_owned(),
                }),
            _ => Ok(UdfValue::String(text.to_owned())),
        }
    }
}

impl fmt::Display for UdfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field value, tagged with its category.
#[derive(Debug, Clone, PartialEq)]
pub enum UdfValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl UdfValue {
    pub fn category(&self) -> &'static str {
        match self {
            UdfValue::String(_) => "string",
            UdfValue::Integer(_) => "integer",
            UdfValue::Float(_) => "float",
            UdfValue::Boolean(_) => "boolean",
            UdfValue::Date(_) => "date",
        }
    }

    /// Type given to a new field created from this value.
    pub fn inferred_type(&self) -> UdfType {
        match self {
            UdfValue::String(_) => UdfType::String,
            UdfValue::Integer(_) | UdfValue::Float(_) => UdfType::Numeric,
            UdfValue::Boolean(_) => UdfType::Boolean,
            UdfValue::Date(_) => UdfType::Date,
        }
    }

    /// Wire text: lowercase booleans, decimal numbers, ISO dates.
    pub fn to_text(&self) -> String {
        match self {
            UdfValue::String(s) => s.clone(),
            UdfValue::Integer(i) => i.to_string(),
            UdfValue::Float(f) => f.to_string(),
            UdfValue::Boolean(b) => b.to_string(),
            UdfValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }
}

impl From<&str> for UdfValue {
    fn from(s: &str) -> Self {
        UdfValue::String(s.to_owned())
    }
}

impl From<String> for UdfValue {
    fn from(s: String) -> Self {
        UdfValue::String(s)
    }
}

impl From<i64> for UdfValue {
    fn from(i: i64) -> Self {
        UdfValue::Integer(i)
    }
}

impl From<i32> for UdfValue {
    fn from(i: i32) -> Self {
        UdfValue::Integer(i.into())
    }
}

impl From<f64> for UdfValue {
    fn from(f: f64) -> Self {
        UdfValue::Float(f)
    }
}

impl From<bool> for UdfValue {
    fn from(b: bool) -> Self {
        UdfValue::Boolean(b)
    }
}

impl From<NaiveDate> for UdfValue {
    fn from(d: NaiveDate) -> Self {
        UdfValue::Date(d)
    }
}

/// Name → typed value view over the `udf:field` children of a container.
pub struct UdfDictionary<'a> {
    root: &'a mut Element,
    nesting: Path,
    tag: QName,
    fields: KeyedElems,
}

impl<'a> UdfDictionary<'a> {
    pub fn new(root: &'a mut Element, nested: &[&str]) -> Self {
        let nesting = nesting(nested);
        let tag = QName::new(UDF, "field");
        let fields = lookup(root, &nesting)
            .map(|c| {
                KeyedElems::scan(
                    c,
                    |child| child.name == tag,
                    |child| child.attr("name").map(str::to_owned),
                )
            })
            .unwrap_or_default();
        Self {
            root,
            nesting,
            tag,
            fields,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.len() == 0
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Field names in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys()
    }

    fn node(&self, name: &str) -> Result<&Element> {
        self.fields
            .get(name)
            .and_then(|pos| lookup(&*self.root, &self.nesting)?.child(pos))
            .ok_or_else(|| BindError::MissingKey(name.to_owned()))
    }

    pub fn field_type(&self, name: &str) -> Result<UdfType> {
        let node = self.node(name)?;
        Ok(UdfType::parse(node.attr("type").unwrap_or_default()))
    }

    /// Value coerced to the field's declared type; `Ok(None)` when the field
    /// is present but empty.
    pub fn get(&self, name: &str) -> Result<Option<UdfValue>> {
        let node = self.node(name)?;
        let kind = UdfType::parse(node.attr("type").unwrap_or_default());
        match node.text() {
            None => Ok(None),
            Some(text) => kind.decode(text).map(Some),
        }
    }

    /// Every `(name, value)` pair in document order.
    pub fn items(&self) -> Result<Vec<(String, Option<UdfValue>)>> {
        self.fields
            .keys()
            .map(|name| Ok((name.to_owned(), self.get(name)?)))
            .collect()
    }

    /// Write a field. An existing field keeps its declared type and rejects
    /// values of another category; a new field is appended with the type
    /// inferred from `value`.
    pub fn set(&mut self, name: &str, value: impl Into<UdfValue>) -> Result<()> {
        let value = value.into();
        if let Some(pos) = self.fields.get(name) {
            let kind = self.field_type(name)?;
            if !kind.accepts(&value) {
                return Err(BindError::TypeMismatch {
                    field: name.to_owned(),
                    declared: kind.to_string(),
                    given: value.category(),
                });
            }
            let container = resolve(self.root, &self.nesting);
            if let Some(node) = container.child_mut(pos) {
                node.set_text(value.to_text());
            }
            return Ok(());
        }

        let node = Element::new(self.tag.clone())
            .with_attr("type", value.inferred_type().as_str())
            .with_attr("name", name)
            .with_text(value.to_text());
        let pos = resolve(self.root, &self.nesting).push(node);
        debug!(field = %name, kind = %value.inferred_type(), pos, "created user-defined field");
        self.fields.push(name.to_owned(), pos);
        Ok(())
    }

    /// Remove the field, along with any duplicate of it in the document.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let positions = self
            .fields
            .remove(name)
            .ok_or_else(|| BindError::MissingKey(name.to_owned()))?;
        if let Some(container) = lookup_mut(self.root, &self.nesting) {
            remove_children(container, &positions);
        }
        debug!(field = %name, "removed user-defined field");
        Ok(())
    }

    /// Remove every field node, named or not, leaving other children of the
    /// container alone.
    pub fn clear(&mut self) {
        let positions = self.fields.drain_descending();
        if let Some(container) = lookup_mut(self.root, &self.nesting) {
            remove_children(container, &positions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accepts_empty_string_only() {
        assert!(UdfType::Numeric.accepts(&"".into()));
        assert!(!UdfType::Numeric.accepts(&"433".into()));
        assert!(UdfType::Numeric.accepts(&2.5.into()));
    }

    #[test]
    fn numeric_decodes_int_then_float() {
        assert_eq!(UdfType::Numeric.decode("42").unwrap(), UdfValue::Integer(42));
        assert_eq!(UdfType::Numeric.decode("4.5").unwrap(), UdfValue::Float(4.5));
        assert!(matches!(
            UdfType::Numeric.decode("lots"),
            Err(BindError::MalformedValue { expected: "numeric", .. })
        ));
    }

    #[test]
    fn type_names_case_insensitive() {
        assert_eq!(UdfType::parse("NUMERIC"), UdfType::Numeric);
        assert_eq!(UdfType::parse("uri").as_str(), "URI");
        assert_eq!(UdfType::parse("Multiline Text"), UdfType::Other("Multiline Text".into()));
    }

    #[test]
    fn date_text_is_iso() {
        let d = NaiveDate::from_ymd_opt(2011, 12, 25).unwrap();
        assert_eq!(UdfValue::from(d).to_text(), "2011-12-25");
        assert_eq!(UdfType::Date.decode("2011-12-25").unwrap(), UdfValue::Date(d));
    }
}
