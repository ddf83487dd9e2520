//! Notification messages and their wire framing.
//!
//! Messages travel as JSON text frames of the form `["_moon", message]`:
//!
//! ```json
//! ["_moon", {"event": "change", "data": {"action": "reloadSingle", "file": "public/css/app.styl"}}]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Channel name carried in the first element of every frame.
pub const CHANNEL: &str = "_moon";

/// A build or file-change event pushed to the browser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum Notification {
    /// The upstream build failed.
    Error(BuildFailure),
    /// Files changed.
    Change(Change),
}

/// Payload of an `error` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildFailure {
    /// File that failed to build.
    pub file: String,
    /// Error details as reported by the build step.
    #[serde(default)]
    pub error: Value,
}

/// Payload of a `change` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Change {
    /// Reload the whole page.
    Reload,
    /// Refresh a single asset in place.
    ReloadSingle {
        /// Changed file, relative to the project root.
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        changes: Option<Value>,
    },
    /// Data update; carries no UI action.
    Update {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        changes: Option<Value>,
    },
}

impl Notification {
    /// `change`/`reload` message.
    pub fn reload() -> Self {
        Self::Change(Change::Reload)
    }

    /// `change`/`reloadSingle` message for `file`.
    pub fn reload_single(file: impl Into<String>) -> Self {
        Self::Change(Change::ReloadSingle {
            file: file.into(),
            changes: None,
        })
    }

    /// `error` message for a failed build of `file`.
    pub fn build_error(file: impl Into<String>, error: Value) -> Self {
        Self::Error(BuildFailure {
            file: file.into(),
            error,
        })
    }

    /// Interpret a JSON message.
    ///
    /// Messages without an `event`, with an unknown event or action, or
    /// missing a required field yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match serde_json::from_value(value) {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring unrecognised notification");
                None
            }
        }
    }

    /// Encode as a `["_moon", message]` text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&(CHANNEL, self))
    }
}

/// Extract the message payload from a text frame on the `_moon` channel.
///
/// Frames that are not JSON, not a `[channel, payload]` pair, or addressed
/// to another channel yield `None`.
pub fn decode_frame(text: &str) -> Option<Value> {
    let Ok(Value::Array(mut parts)) = serde_json::from_str::<Value>(text) else {
        tracing::debug!("Ignoring malformed frame");
        return None;
    };
    if parts.len() != 2 || parts[0].as_str() != Some(CHANNEL) {
        tracing::debug!(channel = ?parts.first(), "Ignoring frame for another channel");
        return None;
    }
    parts.pop()
}
