//! Applies notifications to a page.

use std::time::Instant;

use moon_dom::{Document, NodeId, Selector};
use serde_json::Value;

use crate::asset::{AssetKind, ClientConfig};
use crate::error::ClientError;
use crate::host::PageHost;
use crate::message::{BuildFailure, Change, Notification, decode_frame};

/// Result of handling one notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The message was not recognised.
    Ignored,
    /// The page was asked to reload.
    Reloaded,
    /// A replacement link was inserted next to the current stylesheet.
    StylesheetSwapStarted {
        /// The new `link` element.
        link: NodeId,
    },
    /// No stylesheet matched, so a new link was appended.
    StylesheetAppended {
        /// The new `link` element.
        link: NodeId,
    },
    /// Matching images were re-fetched.
    ImagesRefreshed { count: usize },
    /// Recognised message with nothing to do.
    NoAction,
}

/// A stylesheet replacement waiting for its new link to load.
#[derive(Debug)]
struct PendingSwap {
    url: String,
    link: NodeId,
    replaced: Vec<NodeId>,
    deadline: Instant,
}

/// Live reload client bound to a page host.
#[derive(Debug)]
pub struct LiveReloadClient<H> {
    config: ClientConfig,
    host: H,
    pending: Vec<PendingSwap>,
}

impl<H: PageHost> LiveReloadClient<H> {
    /// Client with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(ClientConfig::default(), host)
    }

    pub fn with_config(config: ClientConfig, host: H) -> Self {
        Self {
            config,
            host,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// New links of the swaps still waiting to load.
    pub fn pending_swaps(&self) -> Vec<NodeId> {
        self.pending.iter().map(|swap| swap.link).collect()
    }

    /// Handle a raw text frame from the transport.
    pub fn handle_frame(&mut self, doc: &mut Document, text: &str) -> Result<Outcome, ClientError> {
        match decode_frame(text) {
            Some(payload) => self.handle_value(doc, payload),
            None => Ok(Outcome::Ignored),
        }
    }

    /// Handle a decoded JSON message.
    pub fn handle_value(&mut self, doc: &mut Document, value: Value) -> Result<Outcome, ClientError> {
        match Notification::from_value(value) {
            Some(message) => self.handle(doc, &message),
            None => Ok(Outcome::Ignored),
        }
    }

    /// Apply a notification to the page.
    ///
    /// Build errors are logged and returned as [`ClientError::Build`].
    pub fn handle(
        &mut self,
        doc: &mut Document,
        message: &Notification,
    ) -> Result<Outcome, ClientError> {
        match message {
            Notification::Error(BuildFailure { file, error }) => {
                tracing::error!(file = %file, error = %error, "Build failed");
                Err(ClientError::Build {
                    file: file.clone(),
                    error: error.clone(),
                })
            }
            Notification::Change(Change::Reload) => {
                tracing::info!("Reloading page");
                self.host.reload();
                Ok(Outcome::Reloaded)
            }
            Notification::Change(Change::ReloadSingle { file, .. }) => {
                self.reload_single(doc, file, Instant::now())
            }
            Notification::Change(Change::Update { .. }) => Ok(Outcome::NoAction),
        }
    }

    fn reload_single(
        &mut self,
        doc: &mut Document,
        file: &str,
        now: Instant,
    ) -> Result<Outcome, ClientError> {
        let asset = self.config.resolve(file);
        tracing::debug!(file, url = %asset.url, kind = ?asset.kind, "Reloading asset");

        match asset.kind {
            AssetKind::Stylesheet => self.swap_stylesheet(doc, asset.url, now),
            AssetKind::Image => self.refresh_images(doc, &asset.url),
            AssetKind::Other => Ok(Outcome::NoAction),
        }
    }

    fn swap_stylesheet(
        &mut self,
        doc: &mut Document,
        url: String,
        now: Instant,
    ) -> Result<Outcome, ClientError> {
        let current = doc.select(doc.root(), &Selector::tag_with_attr("link", "href", &url));

        let link = doc.create_element("link");
        doc.set_attr(link, "rel", "stylesheet")?;
        doc.set_attr(link, "href", &url)?;

        let Some(&last) = current.last() else {
            let parent = doc.head().unwrap_or_else(|| doc.root());
            doc.append_child(parent, link)?;
            tracing::debug!(url = %url, "Appended stylesheet");
            return Ok(Outcome::StylesheetAppended { link });
        };

        doc.insert_after(last, link)?;

        // An earlier pending link for this URL is among `current` and goes
        // away with the rest once the new one loads.
        self.pending.retain(|swap| swap.url != url);
        self.pending.push(PendingSwap {
            url,
            link,
            replaced: current,
            deadline: now + self.config.stylesheet_timeout,
        });
        Ok(Outcome::StylesheetSwapStarted { link })
    }

    fn refresh_images(&mut self, doc: &mut Document, url: &str) -> Result<Outcome, ClientError> {
        let images = doc.select(doc.root(), &Selector::tag_with_attr("img", "src", url));
        for &img in &images {
            doc.set_attr(img, "src", url)?;
            self.host.fetch(url);
        }
        Ok(Outcome::ImagesRefreshed {
            count: images.len(),
        })
    }

    /// Complete the swap whose new link finished loading.
    ///
    /// Returns `false` when `link` belongs to no pending swap.
    pub fn stylesheet_loaded(
        &mut self,
        doc: &mut Document,
        link: NodeId,
    ) -> Result<bool, ClientError> {
        let Some(swap) = self.take_swap(link) else {
            return Ok(false);
        };
        for old in swap.replaced {
            if doc.contains(old) {
                doc.remove(old)?;
            }
        }
        tracing::debug!(url = %swap.url, "Stylesheet swapped");
        Ok(true)
    }

    /// Abandon the swap whose new link failed to load, keeping the old links.
    pub fn stylesheet_failed(
        &mut self,
        doc: &mut Document,
        link: NodeId,
    ) -> Result<bool, ClientError> {
        let Some(swap) = self.take_swap(link) else {
            return Ok(false);
        };
        tracing::warn!(url = %swap.url, "Stylesheet failed to load");
        abandon(doc, &swap)?;
        Ok(true)
    }

    /// Abandon every swap whose deadline has passed. Returns how many expired.
    pub fn expire(&mut self, doc: &mut Document, now: Instant) -> Result<usize, ClientError> {
        let (expired, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|swap| swap.deadline <= now);
        self.pending = pending;

        for swap in &expired {
            tracing::warn!(url = %swap.url, "Stylesheet swap timed out");
            abandon(doc, swap)?;
        }
        Ok(expired.len())
    }

    fn take_swap(&mut self, link: NodeId) -> Option<PendingSwap> {
        let pos = self.pending.iter().position(|swap| swap.link == link)?;
        Some(self.pending.remove(pos))
    }
}

fn abandon(doc: &mut Document, swap: &PendingSwap) -> Result<(), ClientError> {
    if doc.contains(swap.link) {
        doc.remove(swap.link)?;
    }
    Ok(())
}
