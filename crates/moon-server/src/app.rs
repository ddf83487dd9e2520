//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;

use crate::live_reload;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Path of the notification WebSocket.
pub(crate) const SOCKET_PATH: &str = "/sio";

pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();

    if state.live_reload.is_some() {
        router = router.route(SOCKET_PATH, get(live_reload::ws_handler));
    }

    router
        .merge(static_files::static_router(&state.public_dir))
        .layer(
            ServiceBuilder::new()
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn state(public_dir: std::path::PathBuf) -> Arc<AppState> {
        Arc::new(AppState {
            public_dir,
            live_reload: None,
        })
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "ok").unwrap();

        let response = create_router(state(dir.path().to_path_buf()))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
        assert!(headers.contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn test_socket_route_absent_without_live_reload() {
        let dir = tempfile::tempdir().unwrap();

        let response = create_router(state(dir.path().to_path_buf()))
            .oneshot(Request::get(SOCKET_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Falls through to static files, where no `sio` file exists.
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
