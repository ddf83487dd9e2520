//! WebSocket endpoint carrying `_moon` frames.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// Upgrade `/sio` requests to a notification stream.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Forward broadcast notifications until either side goes away.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let Some(live_reload) = &state.live_reload else {
        return;
    };
    let mut receiver = live_reload.subscribe();
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = receiver.recv() => match result {
                Ok(message) => {
                    let frame = match message.to_frame() {
                        Ok(frame) => frame,
                        Err(err) => {
                            tracing::warn!(error = %err, "Failed to encode notification");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Live reload client lagging");
                }
                Err(RecvError::Closed) => break,
            },
            // Client messages are only keepalives.
            result = socket.recv() => match result {
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }

    tracing::debug!("Live reload client disconnected");
}
