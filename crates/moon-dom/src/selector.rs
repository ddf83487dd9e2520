//! Minimal element selectors.
//!
//! Supports `tag`, `[attr]`, `[attr=value]` and `tag[attr=value]`, with the
//! value optionally single- or double-quoted. This covers the lookups the
//! reload client and template binder perform.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::error::DomError;
use crate::node::{Element, NodeId};

/// Pattern for `tag[attr=value]` selectors.
static SELECTOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z][\w-]*)?(?:\[([\w:-]+)(?:=(?:'([^']*)'|"([^"]*)"|([^\]'"]*)))?\])?$"#)
        .expect("invalid selector regex")
});

/// A parsed selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    attr: Option<(String, Option<String>)>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(selector: &str) -> Result<Self, DomError> {
        let selector = selector.trim();
        let caps = SELECTOR_PATTERN
            .captures(selector)
            .filter(|_| !selector.is_empty())
            .ok_or_else(|| DomError::Selector(selector.to_owned()))?;

        let tag = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
        let attr = caps.get(2).map(|name| {
            let value = caps
                .get(3)
                .or_else(|| caps.get(4))
                .or_else(|| caps.get(5))
                .map(|m| m.as_str().to_owned());
            (name.as_str().to_ascii_lowercase(), value)
        });

        Ok(Self { tag, attr })
    }

    /// Match elements with the given tag.
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            attr: None,
        }
    }

    /// Match elements with the given tag and exact attribute value.
    #[must_use]
    pub fn tag_with_attr(tag: &str, attr: &str, value: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            attr: Some((attr.to_ascii_lowercase(), Some(value.to_owned()))),
        }
    }

    /// Whether an element matches.
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && element.tag != *tag
        {
            return false;
        }
        match &self.attr {
            None => true,
            Some((name, None)) => element.attr(name).is_some(),
            Some((name, Some(value))) => element.attr(name) == Some(value.as_str()),
        }
    }
}

impl Document {
    /// Descendant elements of `root` matching `selector`, in document order.
    pub fn select(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|el| selector.matches(el)))
            .collect()
    }

    /// Like [`Document::select`], parsing the selector first.
    pub fn select_str(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        Ok(self.select(root, &Selector::parse(selector)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        Document::parse(concat!(
            r#"<html><head><link rel="stylesheet" href="/css/a.css">"#,
            r#"<link rel="icon" href="/favicon.ico"></head>"#,
            r#"<body><img src="/img/a.png"><p><img src="/img/b.png"></p></body></html>"#
        ))
        .unwrap()
    }

    #[test]
    fn test_parse_tag_only() {
        let sel = Selector::parse("IMG").unwrap();
        assert_eq!(sel, Selector::tag("img"));
    }

    #[test]
    fn test_parse_quoted_attr_value() {
        let sel = Selector::parse("link[href='/css/a.css']").unwrap();
        assert_eq!(sel, Selector::tag_with_attr("link", "href", "/css/a.css"));

        let sel = Selector::parse(r#"link[href="/css/a.css"]"#).unwrap();
        assert_eq!(sel, Selector::tag_with_attr("link", "href", "/css/a.css"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Selector::parse("div > p"),
            Err(DomError::Selector(_))
        ));
        assert!(Selector::parse("").is_err());
    }

    #[test]
    fn test_select_tag() {
        let doc = page();
        assert_eq!(doc.select(doc.root(), &Selector::tag("img")).len(), 2);
    }

    #[test]
    fn test_select_attr_value() {
        let doc = page();
        let found = doc
            .select_str(doc.root(), "link[href='/css/a.css']")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(doc.attr(found[0], "rel"), Some("stylesheet"));
    }

    #[test]
    fn test_select_attr_presence() {
        let doc = page();
        assert_eq!(doc.select_str(doc.root(), "[src]").unwrap().len(), 2);
        assert_eq!(doc.select_str(doc.root(), "[rel=icon]").unwrap().len(), 1);
    }
}
