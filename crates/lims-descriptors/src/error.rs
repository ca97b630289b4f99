use lims_xml::XmlError;
use thiserror::Error;

/// Everything a binding can report to its caller.
///
/// Bindings never retry and never paper over bad stored data: a value that
/// does not parse as its declared type surfaces as [`BindError::MalformedValue`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("key not found: {0}")]
    MissingKey(String),

    #[error("{declared} field {field:?} cannot take a {given} value")]
    TypeMismatch {
        field: String,
        declared: String,
        given: &'static str,
    },

    #[error("{0} is read-only")]
    NotSupported(&'static str),

    #[error("malformed {expected} value: {value:?}")]
    MalformedValue { expected: &'static str, value: String },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("missing element: {0}")]
    MissingElement(String),

    #[error("element {element} has no {attr:?} attribute")]
    MissingAttribute { element: String, attr: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Xml(#[from] XmlError),
}

pub type Result<T> = std::result::Result<T, BindError>;
