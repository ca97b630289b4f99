//! [`Element`] tree → XML text.

use indexmap::IndexMap;

use crate::{Element, NamespaceMap, QName};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

/// Prefixes chosen for every namespace URI used in one document.
struct Prefixes(IndexMap<String, String>);

impl Prefixes {
    fn collect(root: &Element, ns: &NamespaceMap) -> Self {
        let mut out: IndexMap<String, String> = IndexMap::new();
        let mut generated = 0usize;
        let mut add = |uri: &str, out: &mut IndexMap<String, String>| {
            if out.contains_key(uri) {
                return;
            }
            let prefix = match ns.prefix_for(uri) {
                Some(p) => p.to_owned(),
                None => {
                    let p = format!("ns{generated}");
                    generated += 1;
                    p
                }
            };
            out.insert(uri.to_owned(), prefix);
        };
        for el in root.descendants() {
            if let Some(uri) = &el.name.namespace {
                add(uri, &mut out);
            }
            for key in el.attributes().keys() {
                if let Some(uri) = QName::from_clark(key).namespace {
                    add(&uri, &mut out);
                }
            }
        }
        Prefixes(out)
    }

    fn render(&self, name: &QName) -> String {
        match &name.namespace {
            Some(uri) => match self.0.get(uri) {
                Some(prefix) => format!("{}:{}", prefix, name.local),
                None => name.local.clone(),
            },
            None => name.local.clone(),
        }
    }
}

impl Element {
    /// Serialize this element as a standalone XML document.
    ///
    /// Every namespace used anywhere in the tree is declared once on the root
    /// with its prefix from `ns`; unknown URIs get `ns0`, `ns1`, ...
    pub fn to_xml(&self, ns: &NamespaceMap) -> String {
        let prefixes = Prefixes::collect(self, ns);
        let mut out = String::from(DECLARATION);
        out.push('\n');
        write_element(self, &prefixes, true, &mut out);
        out
    }
}

fn write_element(el: &Element, prefixes: &Prefixes, is_root: bool, out: &mut String) {
    let tag = prefixes.render(&el.name);
    out.push('<');
    out.push_str(&tag);
    if is_root {
        for (uri, prefix) in &prefixes.0 {
            out.push_str(&format!(" xmlns:{}=\"{}\"", prefix, escape_attr(uri)));
        }
    }
    for (key, value) in el.attributes() {
        out.push(' ');
        out.push_str(&prefixes.render(&QName::from_clark(key)));
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    if el.text().is_none() && el.children().is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');
    if let Some(text) = el.text() {
        out.push_str(&escape_text(text));
    }
    for child in el.children() {
        write_element(child, prefixes, false, out);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}
