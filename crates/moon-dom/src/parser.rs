//! Markup fragment parser.
//!
//! Builds document nodes from HTML-flavoured markup using `quick-xml` events.
//! The reader runs in a lenient mode so common HTML habits survive: void
//! elements without a closing slash, unquoted or valueless attributes,
//! stray end tags, and bare `&` or `<` characters in text.

use std::borrow::Cow;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::document::Document;
use crate::entities::decode_entity;
use crate::error::DomError;
use crate::node::{Element, NodeId, is_void_element};

/// Open elements and finished top-level nodes of one parse.
#[derive(Default)]
struct TreeBuilder {
    roots: Vec<NodeId>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn attach(&mut self, doc: &mut Document, node: NodeId) -> Result<(), DomError> {
        match self.open.last() {
            Some(&parent) => doc.append_child(parent, node),
            None => {
                self.roots.push(node);
                Ok(())
            }
        }
    }

    /// Append text, merging with a preceding text node.
    fn append_text(&mut self, doc: &mut Document, text: &str) -> Result<(), DomError> {
        if text.is_empty() {
            return Ok(());
        }
        let last = match self.open.last() {
            Some(&parent) => doc.children(parent).last().copied(),
            None => self.roots.last().copied(),
        };
        if let Some(last) = last
            && let Some(existing) = doc.text(last)
        {
            let merged = format!("{existing}{text}");
            doc.set_text(last, merged)?;
            return Ok(());
        }
        let node = doc.create_text(text);
        self.attach(doc, node)
    }

    /// Close the nearest open element named `tag`; unmatched end tags are ignored.
    fn close(&mut self, doc: &Document, tag: &str) {
        if let Some(pos) = self
            .open
            .iter()
            .rposition(|&id| doc.tag(id) == Some(tag))
        {
            self.open.truncate(pos);
        } else {
            tracing::trace!(tag, "Ignoring unmatched end tag");
        }
    }
}

impl Document {
    /// Parse a markup fragment into detached top-level nodes.
    ///
    /// Nothing is inserted into the tree; the caller decides where the
    /// returned nodes go. On error no nodes are left behind.
    pub fn parse_fragment(&mut self, markup: &str) -> Result<Vec<NodeId>, DomError> {
        let markup = escape_stray_lt(markup);
        let mut reader = Reader::from_str(&markup);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.allow_dangling_amp = true;

        let mut builder = TreeBuilder::default();
        match self.read_events(&mut reader, &mut builder) {
            Ok(()) => Ok(builder.roots),
            Err(err) => {
                for node in builder.roots {
                    if let Err(cleanup) = self.remove(node) {
                        tracing::debug!(?node, error = %cleanup, "Failed to free partial parse");
                    }
                }
                Err(err)
            }
        }
    }

    fn read_events<R: BufRead>(
        &mut self,
        reader: &mut Reader<R>,
        builder: &mut TreeBuilder,
    ) -> Result<(), DomError> {
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let element = decode_element(reader, &e);
                    let is_void = element.is_void();
                    let node = self.alloc_element(element);
                    builder.attach(self, node)?;
                    if !is_void {
                        builder.open.push(node);
                    }
                }
                Event::Empty(e) => {
                    let node = self.alloc_element(decode_element(reader, &e));
                    builder.attach(self, node)?;
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    builder.append_text(self, &text)?;
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    builder.append_text(self, &decode_entity(&entity))?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e);
                    builder.append_text(self, &text)?;
                }
                Event::End(e) => {
                    let tag = decode_name(reader, e.name().as_ref()).to_ascii_lowercase();
                    if !is_void_element(&tag) {
                        builder.close(self, &tag);
                    }
                }
                Event::Eof => return Ok(()),
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }
    }

    fn alloc_element(&mut self, element: Element) -> NodeId {
        let node = self.create_element(&element.tag);
        for (key, value) in element.attrs {
            // Freshly created element: cannot fail.
            let _ = self.set_attr(node, &key, value);
        }
        node
    }
}

/// Escape every `<` that cannot open markup.
///
/// Like an HTML tokenizer, a `<` counts as text unless a tag name, `/`, `!`
/// or `?` follows it and a `>` closes it later on.
fn escape_stray_lt(markup: &str) -> Cow<'_, str> {
    let is_stray = |after: &str| {
        let opens = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        !opens || !after.contains('>')
    };

    if !markup
        .match_indices('<')
        .any(|(pos, _)| is_stray(&markup[pos + 1..]))
    {
        return Cow::Borrowed(markup);
    }

    let mut escaped = String::with_capacity(markup.len() + 8);
    let mut rest = markup;
    while let Some(pos) = rest.find('<') {
        escaped.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        escaped.push_str(if is_stray(after) { "&lt;" } else { "<" });
        rest = after;
    }
    escaped.push_str(rest);
    Cow::Owned(escaped)
}

fn decode_element<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> Element {
    let mut element = Element::new(decode_name(reader, e.name().as_ref()));
    for attr in e.html_attributes().flatten() {
        let key = decode_name(reader, attr.key.as_ref());
        let value = attr
            .unescape_value()
            .map_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned(), Cow::into_owned);
        element.set_attr(&key, value);
    }
    element
}

fn decode_name<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        Cow::into_owned,
    )
}
