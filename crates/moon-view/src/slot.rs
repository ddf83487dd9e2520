//! A bound placeholder region of a view.

use moon_dom::{Document, NodeId};

use crate::error::ViewError;
use crate::modifier::ModifierRegistry;
use crate::value::{SlotValue, format_number};

/// Runtime binding between a marker's name and its live content.
#[derive(Clone, Debug)]
pub struct Slot {
    name: String,
    /// Detached copy of the content present at bind time.
    initial: Vec<NodeId>,
    editable: bool,
    modifier: Option<String>,
    /// Currently attached content; never empty.
    refs: Vec<NodeId>,
    /// `contenteditable` wrapper for editable slots.
    editor: Option<NodeId>,
    /// Markup of `refs` after the last render.
    val: String,
}

impl Slot {
    pub(crate) fn new(
        name: String,
        initial: Vec<NodeId>,
        editable: bool,
        modifier: Option<String>,
        refs: Vec<NodeId>,
        editor: Option<NodeId>,
        doc: &Document,
    ) -> Self {
        let val = doc.html_of(&refs);
        Self {
            name,
            initial,
            editable,
            modifier,
            refs,
            editor,
            val,
        }
    }

    /// Slot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the slot accepts user edits.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Modifier name, if any.
    pub fn modifier(&self) -> Option<&str> {
        self.modifier.as_deref()
    }

    /// Nodes currently representing the slot.
    pub fn nodes(&self) -> &[NodeId] {
        &self.refs
    }

    /// The `contenteditable` wrapper of an editable slot.
    pub fn editor(&self) -> Option<NodeId> {
        self.editor
    }

    /// Markup cached after the last render.
    pub fn value(&self) -> &str {
        &self.val
    }

    /// Current markup read from the document.
    pub fn html(&self, doc: &Document) -> String {
        doc.html_of(&self.refs)
    }

    /// Render a value into the slot.
    ///
    /// With `suppress_formatting` the value is rendered verbatim; otherwise
    /// empty markup restores the initial content and any other value passes
    /// through the slot's modifier first.
    pub(crate) fn update(
        &mut self,
        doc: &mut Document,
        registry: &ModifierRegistry,
        value: SlotValue,
        suppress_formatting: bool,
    ) -> Result<(), ViewError> {
        let value = if suppress_formatting {
            value
        } else if value.is_empty() {
            SlotValue::Nodes(self.clone_initial(doc)?)
        } else if let Some(modifier) = &self.modifier {
            registry
                .apply(modifier, value)
                .map_err(|source| ViewError::Modifier {
                    slot: self.name.clone(),
                    source,
                })?
        } else {
            value
        };

        let mut nodes = render(doc, value)?;
        if nodes.is_empty() {
            // Keeps the slot's position in the document.
            nodes.push(doc.create_text(""));
        }

        let old = match self.editor {
            // User edits may have rewritten the editor's children directly.
            Some(editor) if suppress_formatting => doc.children(editor).to_vec(),
            _ => self.refs.clone(),
        };

        match (old.is_empty(), self.editor) {
            (true, Some(editor)) => {
                for &node in &nodes {
                    doc.append_child(editor, node)?;
                }
            }
            _ => doc.replace_nodes(&old, &nodes)?,
        }

        for node in old {
            if !nodes.contains(&node) {
                doc.remove(node)?;
            }
        }

        self.refs = nodes;
        self.val = doc.html_of(&self.refs);
        tracing::trace!(slot = %self.name, value = %self.val, "Slot updated");
        Ok(())
    }

    fn clone_initial(&self, doc: &mut Document) -> Result<Vec<NodeId>, ViewError> {
        self.initial
            .iter()
            .map(|&node| doc.deep_clone(node).map_err(ViewError::from))
            .collect()
    }
}

/// Turn a value into detached nodes (the stateless replacement for a shared
/// staging element).
fn render(doc: &mut Document, value: SlotValue) -> Result<Vec<NodeId>, ViewError> {
    match value {
        SlotValue::Markup(markup) => Ok(doc.parse_fragment(&markup)?),
        SlotValue::Number(n) => Ok(vec![doc.create_text(format_number(n))]),
        SlotValue::Nodes(nodes) => {
            for &node in &nodes {
                if !doc.contains(node) {
                    return Err(moon_dom::DomError::InvalidNode(node).into());
                }
            }
            Ok(nodes)
        }
    }
}
