//! Static file serving from the public directory.
//!
//! `ServeDir` maps directories to `index.html`, decodes percent-encoded
//! paths and refuses paths that escape the directory.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::CACHE_CONTROL;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::AppState;

/// Router serving every path not claimed by another route.
///
/// Responses are marked `no-cache` so browsers revalidate assets after a
/// live reload.
pub(crate) fn static_router(public_dir: &Path) -> Router<Arc<AppState>> {
    let service = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .service(ServeDir::new(public_dir));

    Router::new().fallback_service(service)
}
