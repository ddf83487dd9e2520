//! Error types for the document model.

use std::str::Utf8Error;

use crate::NodeId;

/// Error from document parsing or mutation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DomError {
    /// Markup parsing error.
    #[error("markup parse error")]
    Parse(#[from] quick_xml::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error")]
    Utf8(#[from] Utf8Error),

    /// Encoding error during markup parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Node id does not refer to a live node of this document.
    #[error("invalid node: {0:?}")]
    InvalidNode(NodeId),

    /// Operation requires an element node.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// Operation requires a text node.
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),

    /// Node cannot hold children (text nodes, void elements).
    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),

    /// Operation requires the node to have a parent.
    #[error("node {0:?} is detached")]
    Detached(NodeId),

    /// Insertion would make a node its own ancestor.
    #[error("cannot insert {node:?} into its own subtree at {parent:?}")]
    Cycle {
        /// Node being inserted.
        node: NodeId,
        /// Target parent.
        parent: NodeId,
    },

    /// Unsupported selector syntax.
    #[error("invalid selector: {0}")]
    Selector(String),
}
