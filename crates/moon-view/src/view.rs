//! Template binding.
//!
//! A [`View`] is built from template markup containing `<moon>` markers:
//!
//! ```html
//! <li class="message">
//!   <moon data-var="author" data-modifier="ucwords">anonymous</moon>
//!   <moon data-var="body" data-editable="true"></moon>
//! </li>
//! ```
//!
//! Each marker becomes a [`Slot`]. The marker element itself is unwrapped so
//! only its content remains, and binding attributes are stripped from the
//! rest of the template.

use std::collections::HashMap;
use std::sync::Arc;

use moon_dom::{Document, NodeId, Selector};
use serde_json::Value;

use crate::error::ViewError;
use crate::modifier::ModifierRegistry;
use crate::slot::Slot;
use crate::value::SlotValue;

/// Tag name of placeholder markers.
pub const MARKER_TAG: &str = "moon";

/// Attributes removed from the template after binding.
const BINDING_ATTRS: &[&str] = &[
    "data-var",
    "data-attr",
    "data-target",
    "data-modifier",
    "data-editable",
];

/// A bound template: container node plus named slots.
#[derive(Clone, Debug)]
pub struct View {
    name: String,
    original: String,
    container: NodeId,
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
    registry: Arc<ModifierRegistry>,
}

impl View {
    /// Bind a template with the built-in modifiers.
    pub fn bind(doc: &mut Document, name: &str, template: &str) -> Result<Self, ViewError> {
        Self::bind_with(doc, name, template, Arc::new(ModifierRegistry::default()))
    }

    /// Bind a template with a custom modifier registry.
    ///
    /// The view's nodes live in `doc` under a detached fragment container;
    /// use [`View::append_to`] to mount it.
    pub fn bind_with(
        doc: &mut Document,
        name: &str,
        template: &str,
        registry: Arc<ModifierRegistry>,
    ) -> Result<Self, ViewError> {
        let container = doc.create_fragment();
        let mut view = Self {
            name: name.to_owned(),
            original: template.to_owned(),
            container,
            slots: Vec::new(),
            index: HashMap::new(),
            registry,
        };

        if let Err(err) = view.bind_template(doc) {
            if let Err(cleanup) = doc.remove(container) {
                tracing::debug!(
                    view = %view.name,
                    error = %cleanup,
                    "Failed to free view container"
                );
            }
            return Err(err);
        }

        tracing::debug!(view = %view.name, slots = view.slots.len(), "Bound view template");
        Ok(view)
    }

    fn bind_template(&mut self, doc: &mut Document) -> Result<(), ViewError> {
        for node in doc.parse_fragment(&self.original)? {
            doc.append_child(self.container, node)?;
        }

        let markers = self.find_markers(doc);
        self.check_nesting(doc, &markers)?;
        for marker in markers {
            self.bind_marker(doc, marker)?;
        }

        for node in doc.descendants(self.container) {
            if doc.element(node).is_none() {
                continue;
            }
            for attr in BINDING_ATTRS {
                doc.remove_attr(node, attr)?;
            }
        }
        Ok(())
    }

    /// Every marker in the template, the root included.
    fn find_markers(&self, doc: &Document) -> Vec<NodeId> {
        doc.select(self.container, &Selector::tag(MARKER_TAG))
    }

    fn check_nesting(&self, doc: &Document, markers: &[NodeId]) -> Result<(), ViewError> {
        for &outer in markers {
            for &inner in markers {
                if outer != inner && doc.is_inclusive_ancestor(outer, inner) {
                    return Err(ViewError::NestedMarker {
                        outer: doc.attr(outer, "data-var").unwrap_or_default().to_owned(),
                        inner: doc.attr(inner, "data-var").unwrap_or_default().to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    fn bind_marker(&mut self, doc: &mut Document, marker: NodeId) -> Result<(), ViewError> {
        let name = doc
            .attr(marker, "data-var")
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| ViewError::MissingName {
                view: self.name.clone(),
            })?;
        if self.index.contains_key(&name) {
            return Err(ViewError::DuplicateSlot {
                view: self.name.clone(),
                slot: name,
            });
        }

        let editable = doc.attr(marker, "data-editable").is_some_and(is_truthy);
        let modifier = doc
            .attr(marker, "data-modifier")
            .filter(|m| !m.is_empty())
            .map(str::to_owned);
        if let Some(modifier) = &modifier
            && !self.registry.contains(modifier)
        {
            return Err(ViewError::UnknownModifier {
                slot: name,
                modifier: modifier.clone(),
            });
        }

        let initial = doc.clone_children(marker)?;
        if doc.children(marker).is_empty() {
            let anchor = doc.create_text("");
            doc.append_child(marker, anchor)?;
        }
        let refs = doc.unwrap(marker)?;
        doc.remove(marker)?;

        let editor = if editable {
            let span = doc.create_element("span");
            doc.set_attr(span, "contenteditable", "true")?;
            doc.wrap(&refs, span)?;
            Some(span)
        } else {
            None
        };

        tracing::trace!(view = %self.name, slot = %name, editable, ?modifier, "Bound slot");
        let slot = Slot::new(name.clone(), initial, editable, modifier, refs, editor, doc);
        self.index.insert(name, self.slots.len());
        self.slots.push(slot);
        Ok(())
    }

    /// View name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template markup the view was bound from.
    pub fn template(&self) -> &str {
        &self.original
    }

    /// Fragment node holding the view's content.
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Modifier registry used by this view.
    pub fn registry(&self) -> &Arc<ModifierRegistry> {
        &self.registry
    }

    /// Slots in template order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Look up a slot by name.
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    fn slot_index(&self, name: &str) -> Result<usize, ViewError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ViewError::UnknownSlot(name.to_owned()))
    }

    /// Assign a value to one slot.
    pub fn set(
        &mut self,
        doc: &mut Document,
        name: &str,
        value: impl Into<SlotValue>,
    ) -> Result<(), ViewError> {
        let i = self.slot_index(name)?;
        self.slots[i].update(doc, &self.registry, value.into(), false)
    }

    /// Assign several slots at once.
    ///
    /// Every name is checked before any slot changes: an unknown name fails
    /// the whole batch with [`ViewError::UnknownSlot`].
    pub fn update<I, K, V>(&mut self, doc: &mut Document, values: I) -> Result<(), ViewError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<SlotValue>,
    {
        let batch = values
            .into_iter()
            .map(|(name, value)| Ok((self.slot_index(name.as_ref())?, value.into())))
            .collect::<Result<Vec<_>, ViewError>>()?;

        for (i, value) in batch {
            self.slots[i].update(doc, &self.registry, value, false)?;
        }
        Ok(())
    }

    /// Assign slots from a JSON object of `name → value`.
    pub fn update_json(&mut self, doc: &mut Document, values: &Value) -> Result<(), ViewError> {
        let object = values.as_object().ok_or(ViewError::NotAnObject)?;
        self.update(doc, object.iter().map(|(k, v)| (k, SlotValue::from(v))))
    }

    /// Push user-edited markup into an editable slot, bypassing formatting.
    pub fn apply_edit(
        &mut self,
        doc: &mut Document,
        name: &str,
        markup: &str,
    ) -> Result<(), ViewError> {
        let i = self.slot_index(name)?;
        let slot = &mut self.slots[i];
        if !slot.is_editable() {
            return Err(ViewError::NotEditable(name.to_owned()));
        }
        slot.update(doc, &self.registry, SlotValue::Markup(markup.to_owned()), true)
    }

    /// Re-read an editable slot's content from its editor element.
    pub fn sync_edit(&mut self, doc: &mut Document, name: &str) -> Result<(), ViewError> {
        let i = self.slot_index(name)?;
        let editor = self.slots[i]
            .editor()
            .ok_or_else(|| ViewError::NotEditable(name.to_owned()))?;
        let markup = doc.inner_html(editor);
        self.apply_edit(doc, name, &markup)
    }

    /// Rendered markup of the whole view.
    pub fn html(&self, doc: &Document) -> String {
        doc.outer_html(self.container)
    }

    /// Mount the view under `parent`.
    pub fn append_to(&self, doc: &mut Document, parent: NodeId) -> Result<(), ViewError> {
        doc.append_child(parent, self.container)?;
        Ok(())
    }

    /// Bind a fresh, independent view from the original template.
    pub fn clone_view(&self, doc: &mut Document) -> Result<Self, ViewError> {
        Self::bind_with(doc, &self.name, &self.original, Arc::clone(&self.registry))
    }
}

/// Truthiness of a `data-*` flag: absent, empty, `false` and `0` are false.
fn is_truthy(value: &str) -> bool {
    !matches!(value.trim(), "" | "false" | "0")
}
