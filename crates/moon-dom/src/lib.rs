//! In-memory HTML document model for Moon.
//!
//! Provides the DOM surface the reload client and template binder work on:
//!
//! - [`Document`]: node arena with tree mutations (`append_child`,
//!   `insert_after`, `replace_nodes`, `unwrap`, `wrap`, `remove`, ...)
//! - Fragment parsing ([`Document::parse_fragment`]) backed by `quick-xml`
//! - HTML serialization ([`Document::outer_html`], [`Document::inner_html`])
//! - Simple element selection ([`Selector`])
//!
//! # Example
//!
//! ```
//! use moon_dom::{Document, Selector};
//!
//! let mut doc = Document::parse(r#"<ul><li class="a">One</li></ul>"#).unwrap();
//! let li = doc.select(doc.root(), &Selector::parse("li[class=a]").unwrap())[0];
//! doc.set_attr(li, "class", "b").unwrap();
//!
//! assert_eq!(doc.inner_html(doc.root()), r#"<ul><li class="b">One</li></ul>"#);
//! ```

mod document;
mod entities;
mod error;
mod node;
mod parser;
mod selector;
mod serializer;

pub use document::Document;
pub use error::DomError;
pub use node::{Element, NodeId, NodeKind, is_void_element};
pub use selector::Selector;
pub use serializer::{escape_attr, escape_text};
