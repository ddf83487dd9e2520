//! HTML serialization.

use crate::document::Document;
use crate::node::{NodeId, NodeKind};

/// Elements whose text content is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Document {
    /// Markup of a node including its own tag.
    ///
    /// Fragments serialize as their children; invalid ids serialize as nothing.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(id, false, &mut out);
        out
    }

    /// Markup of a node's children.
    pub fn inner_html(&self, id: NodeId) -> String {
        let raw = self.tag(id).is_some_and(|t| RAW_TEXT_ELEMENTS.contains(&t));
        let mut out = String::new();
        for &child in self.children(id) {
            self.serialize_node(child, raw, &mut out);
        }
        out
    }

    /// Concatenated markup of a node list.
    pub fn html_of(&self, nodes: &[NodeId]) -> String {
        let mut out = String::new();
        for &node in nodes {
            self.serialize_node(node, false, &mut out);
        }
        out
    }

    fn serialize_node(&self, id: NodeId, raw_text: bool, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };

        match &node.kind {
            NodeKind::Text(text) if raw_text => out.push_str(text),
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Fragment => {
                for &child in &node.children {
                    self.serialize_node(child, raw_text, out);
                }
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (key, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');

                if el.is_void() {
                    return;
                }

                let raw = RAW_TEXT_ELEMENTS.contains(&el.tag.as_str());
                for &child in &node.children {
                    self.serialize_node(child, raw, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

/// Escape text for element content.
pub fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

/// Escape text for attribute values.
pub fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

fn escape_html(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roundtrip(markup: &str) -> String {
        let doc = Document::parse(markup).unwrap();
        doc.inner_html(doc.root())
    }

    #[test]
    fn test_serialize_nested() {
        assert_eq!(
            roundtrip(r#"<ul class="list"><li>One</li><li>Two</li></ul>"#),
            r#"<ul class="list"><li>One</li><li>Two</li></ul>"#
        );
    }

    #[test]
    fn test_serialize_void_without_closing_tag() {
        assert_eq!(
            roundtrip(r#"<link rel="stylesheet" href="/a.css"/><br>"#),
            r#"<link rel="stylesheet" href="/a.css"><br>"#
        );
    }

    #[test]
    fn test_serialize_empty_element_keeps_closing_tag() {
        assert_eq!(roundtrip("<span></span>"), "<span></span>");
        assert_eq!(roundtrip("<span/>"), "<span></span>");
    }

    #[test]
    fn test_serialize_escapes_text_and_attributes() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        doc.set_attr(a, "title", r#"say "hi" & <bye>"#).unwrap();
        let text = doc.create_text("1 < 2 & 3 > 2");
        doc.append_child(a, text).unwrap();

        assert_eq!(
            doc.outer_html(a),
            r#"<a title="say &quot;hi&quot; &amp; &lt;bye&gt;">1 &lt; 2 &amp; 3 &gt; 2</a>"#
        );
    }

    #[test]
    fn test_serialize_fragment_is_transparent() {
        let mut doc = Document::new();
        let fragment = doc.create_fragment();
        let b = doc.create_element("b");
        let text = doc.create_text("x");
        doc.append_child(fragment, b).unwrap();
        doc.append_child(fragment, text).unwrap();

        assert_eq!(doc.outer_html(fragment), "<b></b>x");
    }

    #[test]
    fn test_serialize_raw_text_in_style() {
        let mut doc = Document::new();
        let style = doc.create_element("style");
        let text = doc.create_text("a > b { color: red }");
        doc.append_child(style, text).unwrap();

        assert_eq!(doc.outer_html(style), "<style>a > b { color: red }</style>");
    }

    #[test]
    fn test_html_of_node_list() {
        let mut doc = Document::new();
        let nodes = doc.parse_fragment("a<i>b</i>c").unwrap();
        assert_eq!(doc.html_of(&nodes), "a<i>b</i>c");
    }
}
