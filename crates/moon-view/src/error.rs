//! Error types for template binding.

use moon_dom::DomError;

/// Error from a modifier function.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ModifierError {
    /// Input cannot be read as a timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// No modifier registered under this name.
    #[error("unknown modifier: {0}")]
    Unknown(String),

    /// Failure reported by an application-defined modifier.
    #[error("{0}")]
    Custom(String),
}

/// Error from binding or updating a view.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Document parsing or mutation failed.
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    /// A marker has no `data-var` name.
    #[error("marker without data-var in view {view}")]
    MissingName {
        /// View being bound.
        view: String,
    },

    /// Two markers share a name.
    #[error("duplicate slot {slot} in view {view}")]
    DuplicateSlot {
        /// View being bound.
        view: String,
        /// Repeated slot name.
        slot: String,
    },

    /// A marker sits inside another marker.
    #[error("slot {inner} is nested inside slot {outer}")]
    NestedMarker {
        /// Enclosing slot name.
        outer: String,
        /// Nested slot name.
        inner: String,
    },

    /// A marker names a modifier that is not registered.
    #[error("unknown modifier {modifier} on slot {slot}")]
    UnknownModifier {
        /// Slot name.
        slot: String,
        /// Modifier name.
        modifier: String,
    },

    /// No slot with this name exists in the view.
    #[error("unknown slot: {0}")]
    UnknownSlot(String),

    /// User edit pushed into a slot that is not editable.
    #[error("slot {0} is not editable")]
    NotEditable(String),

    /// Batch values were not a JSON object.
    #[error("slot values must be a JSON object")]
    NotAnObject,

    /// A modifier rejected the value.
    #[error("modifier failed on slot {slot}: {source}")]
    Modifier {
        /// Slot name.
        slot: String,
        /// Underlying modifier error.
        #[source]
        source: ModifierError,
    },
}
