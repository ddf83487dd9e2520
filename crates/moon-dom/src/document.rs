//! Arena-backed document and its tree mutations.

use crate::error::DomError;
use crate::node::{Element, Node, NodeId, NodeKind};

/// An HTML document held in a node arena.
///
/// Every node belongs to exactly one document and is addressed by [`NodeId`].
/// Nodes without a parent are *detached*: they stay valid and can be inserted
/// again until [`Document::remove`] frees them. A node is *attached* when its
/// ancestor chain reaches [`Document::root`].
#[derive(Clone, Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
}

/// Arena entry; `generation` changes every time the slot is freed.
#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        doc.root = doc.alloc(NodeKind::Fragment);
        doc
    }

    /// Parse a complete page into a new document.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        let mut doc = Self::new();
        let root = doc.root;
        for node in doc.parse_fragment(html)? {
            doc.append_child(root, node)?;
        }
        Ok(doc)
    }

    /// The document root (a fragment node).
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, live or free.
    ///
    /// Stays flat when nodes are created and removed at the same rate.
    pub fn arena_len(&self) -> usize {
        self.slots.len()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Some(Node::new(kind));
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = node;
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node,
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index)
            && slot.generation == id.generation
            && slot.node.take().is_some()
        {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DomError::InvalidNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DomError::InvalidNode(id))
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Node kind, if the node exists.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).ok().map(|n| &n.kind)
    }

    /// Element data, if the node is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id)? {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// Tag name, if the node is an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Text of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(existing) => {
                *existing = text.into();
                Ok(())
            }
            _ => Err(DomError::NotText(id)),
        }
    }

    /// Attribute value of an element.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Set an attribute on an element.
    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute from an element, returning the previous value.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element_mut(id)?.remove_attr(name))
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(Element::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// Create a detached fragment node.
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    /// Children of a node (empty for invalid ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[] as &[NodeId], |n| n.children.as_slice())
    }

    /// Whether the node's ancestor chain reaches the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, id)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Detach a node from its parent. Detached nodes are left as they are.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|&c| c != id);
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Validate that `child` may be inserted under `parent`.
    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(child)?;
        if !self.node(parent)?.is_container() {
            return Err(DomError::NotAContainer(parent));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Cycle {
                node: child,
                parent,
            });
        }
        Ok(())
    }

    /// Insert `child` at `index` among `parent`'s children, after detaching it.
    fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        let mut index = index;
        if self.parent(child) == Some(parent)
            && let Some(pos) = self.children(parent).iter().position(|&c| c == child)
            && pos < index
        {
            index -= 1;
        }
        self.detach(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let len = self.node(parent)?.children.len();
        self.insert_at(parent, len, child)
    }

    fn position_in_parent(&self, id: NodeId) -> Result<(NodeId, usize), DomError> {
        let parent = self.parent(id).ok_or(DomError::Detached(id))?;
        let pos = self
            .children(parent)
            .iter()
            .position(|&c| c == id)
            .ok_or(DomError::InvalidNode(id))?;
        Ok((parent, pos))
    }

    /// Insert `node` immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        if reference == node {
            return Ok(());
        }
        let (parent, pos) = self.position_in_parent(reference)?;
        self.insert_at(parent, pos, node)
    }

    /// Insert `node` immediately after `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        if reference == node {
            return Ok(());
        }
        let (parent, pos) = self.position_in_parent(reference)?;
        self.insert_at(parent, pos + 1, node)
    }

    /// Replace a run of nodes with another set of nodes.
    ///
    /// The new nodes are inserted where the first old node stood; every old
    /// node not also in `new` is then detached.
    pub fn replace_nodes(&mut self, old: &[NodeId], new: &[NodeId]) -> Result<(), DomError> {
        let Some(&first) = old.first() else {
            return Ok(());
        };
        let (parent, _) = self.position_in_parent(first)?;
        for &node in new {
            self.check_insert(parent, node)?;
        }
        for &node in new {
            if node != first {
                self.insert_before(first, node)?;
            }
        }
        for &node in old {
            if !new.contains(&node) {
                self.detach(node)?;
            }
        }
        Ok(())
    }

    /// Replace an element with its own children, returning them.
    pub fn unwrap(&mut self, id: NodeId) -> Result<Vec<NodeId>, DomError> {
        self.position_in_parent(id)?;
        let children = self.node(id)?.children.clone();
        for &child in &children {
            self.insert_before(id, child)?;
        }
        self.detach(id)?;
        Ok(children)
    }

    /// Move `nodes` into `wrapper`, placing the wrapper where the first node stood.
    pub fn wrap(&mut self, nodes: &[NodeId], wrapper: NodeId) -> Result<(), DomError> {
        let Some(&first) = nodes.first() else {
            return Ok(());
        };
        if !self.node(wrapper)?.is_container() {
            return Err(DomError::NotAContainer(wrapper));
        }
        self.insert_before(first, wrapper)?;
        for &node in nodes {
            self.append_child(wrapper, node)?;
        }
        Ok(())
    }

    /// Detach a node and free it together with its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root {
            return Err(DomError::Detached(id));
        }
        self.detach(id)?;
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in doomed {
            self.release(node);
        }
        Ok(())
    }

    /// Deep-copy a node and its subtree into a new detached node.
    pub fn deep_clone(&mut self, id: NodeId) -> Result<NodeId, DomError> {
        let node = self.node(id)?;
        let kind = node.kind.clone();
        let children = node.children.clone();
        let copy = self.alloc(kind);
        for child in children {
            let child_copy = self.deep_clone(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Deep-copy every child of `id`, returning detached copies in order.
    pub fn clone_children(&mut self, id: NodeId) -> Result<Vec<NodeId>, DomError> {
        let children = self.node(id)?.children.clone();
        children
            .into_iter()
            .map(|child| self.deep_clone(child))
            .collect()
    }

    /// All descendants of `id` in document order (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        result
    }

    /// First descendant element of `root` with the given tag.
    pub fn find_first_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }

    /// The `head` element of the document, if any.
    pub fn head(&self) -> Option<NodeId> {
        self.find_first_tag(self.root, "head")
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.text(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }
}
