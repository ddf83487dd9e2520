//! Node types stored in a [`Document`](crate::Document) arena.

/// Handle to a node inside a [`Document`](crate::Document).
///
/// Freed arena slots are reused, but each reuse bumps the slot's generation,
/// so a handle to a removed node stays invalid instead of silently pointing
/// at a newer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

/// HTML elements that never have content and serialize without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Whether `tag` names an HTML void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Element data: tag name plus attributes in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
}

impl Element {
    /// Create an element with no attributes.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_ascii_lowercase(), value));
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self
            .attrs
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).1)
    }

    /// Whether this is a void element.
    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag)
    }
}

/// Kind of a document node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// HTML element.
    Element(Element),
    /// Text content (unescaped).
    Text(String),
    /// Transparent grouping node; serializes as its children.
    Fragment,
}

/// Arena slot for one node.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Whether children may be appended to this node.
    pub(crate) fn is_container(&self) -> bool {
        match &self.kind {
            NodeKind::Element(el) => !el.is_void(),
            NodeKind::Fragment => true,
            NodeKind::Text(_) => false,
        }
    }
}
