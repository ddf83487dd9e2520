//! File watching and notification push.

mod debouncer;
mod manager;
mod websocket;

pub use manager::LiveReloadManager;
pub(crate) use websocket::ws_handler;
