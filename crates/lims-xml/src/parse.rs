//! XML text → [`Element`] tree.

use roxmltree::{Document, Node};

use crate::{Element, QName, XmlError};

impl Element {
    /// Parse a complete XML document and return its root element.
    ///
    /// Namespace prefixes are resolved to URIs; comments and processing
    /// instructions are dropped. An element's text is the character data
    /// before its first child element: mixed-content text that follows a
    /// child element (`<a>x<b/>tail</a>`) is not kept, and writing the tree
    /// back out loses it.
    pub fn parse(xml: &str) -> Result<Element, XmlError> {
        let doc = Document::parse(xml).map_err(|e| XmlError::Parse(e.to_string()))?;
        Ok(convert(doc.root_element()))
    }
}

fn convert(node: Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let name = match tag.namespace() {
        Some(uri) => QName::new(uri, tag.name()),
        None => QName::local(tag.name()),
    };
    let mut el = Element::new(name);
    for attr in node.attributes() {
        let key = match attr.namespace() {
            Some(uri) => QName::new(uri, attr.name()).to_string(),
            None => attr.name().to_owned(),
        };
        el.set_attr(key, attr.value());
    }

    // Only the text before the first child element is element text.
    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            break;
        }
        if let Some(t) = child.text().filter(|_| child.is_text()) {
            text.push_str(t);
        }
    }
    if !text.trim().is_empty() {
        el.set_text(text);
    }

    for child in node.children().filter(Node::is_element) {
        el.push(convert(child));
    }
    el
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::UDF;

    #[test]
    fn whitespace_text_dropped() {
        let el = Element::parse("<a>\n  <b>value</b>\n  <c/>\n</a>").unwrap();
        assert_eq!(el.text(), None);
        assert_eq!(el.child_count(), 2);
        assert_eq!(el.find(&QName::local("b")).and_then(Element::text), Some("value"));
        assert_eq!(el.find(&QName::local("c")).and_then(Element::text), None);
    }

    #[test]
    fn prefixes_resolved() {
        let el = Element::parse(
            r#"<e xmlns:udf="http://genologics.com/ri/userdefined"><udf:field name="x">1</udf:field></e>"#,
        )
        .unwrap();
        let field = el.find(&QName::new(UDF, "field")).unwrap();
        assert_eq!(field.attr("name"), Some("x"));
    }

    #[test]
    fn text_after_first_child_not_kept() {
        let el = Element::parse("<a>head<b>inner</b>tail<c/>more</a>").unwrap();
        assert_eq!(el.text(), Some("head"));
        assert_eq!(el.child_count(), 2);
        assert_eq!(el.find(&QName::local("b")).and_then(Element::text), Some("inner"));
    }

    #[test]
    fn malformed_is_error() {
        assert!(matches!(Element::parse("<a><b></a>"), Err(XmlError::Parse(_))));
    }
}
