//! Live reload for Moon pages.
//!
//! The server pushes [`Notification`]s on the `_moon` channel; a
//! [`LiveReloadClient`] applies each one to a [`moon_dom::Document`] with
//! the smallest update that picks up the change:
//!
//! - `change`/`reload`: the [`PageHost`] reloads the page
//! - `change`/`reloadSingle` for a stylesheet: a new `link` is inserted next
//!   to the current one, which is removed once the new one loads
//! - `change`/`reloadSingle` for an image: matching `img` elements re-fetch
//! - `error`: logged and returned as [`ClientError::Build`]
//!
//! Anything else is ignored.

mod asset;
mod client;
mod error;
mod host;
mod message;

pub use asset::{
    Asset, AssetKind, ClientConfig, DEFAULT_PUBLIC_DIR, DEFAULT_STYLESHEET_TIMEOUT, browser_url,
};
pub use client::{LiveReloadClient, Outcome};
pub use error::ClientError;
pub use host::PageHost;
pub use message::{BuildFailure, CHANNEL, Change, Notification, decode_frame};
