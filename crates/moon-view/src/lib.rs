//! Template binding for Moon views.
//!
//! Templates mark placeholder regions with `<moon>` elements. Binding a
//! template produces a [`View`] whose named [`Slot`]s can be updated with
//! markup, numbers or ready-made nodes:
//!
//! ```
//! use moon_dom::Document;
//! use moon_view::View;
//!
//! let mut doc = Document::new();
//! let mut view = View::bind(
//!     &mut doc,
//!     "greeting",
//!     r#"<h1><moon data-var="title" data-modifier="ucwords">hello</moon></h1>"#,
//! )
//! .unwrap();
//!
//! view.set(&mut doc, "title", "good morning").unwrap();
//! assert_eq!(view.html(&doc), "<h1>Good Morning</h1>");
//!
//! // Empty markup restores the template's content.
//! view.set(&mut doc, "title", "").unwrap();
//! assert_eq!(view.html(&doc), "<h1>hello</h1>");
//! ```

mod error;
mod modifier;
mod slot;
mod value;
mod view;

pub use error::{ModifierError, ViewError};
pub use modifier::{
    Modifier, ModifierRegistry, capitalize_words, date, parse_timestamp, time, ucwords,
};
pub use slot::Slot;
pub use value::SlotValue;
pub use view::{MARKER_TAG, View};
