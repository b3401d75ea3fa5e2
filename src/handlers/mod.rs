mod data;
mod files;
mod reference;
mod service_info;

pub use data::{ByteRange, content_type_for, parse_range, serve_file};
pub use files::get_files;
pub use reference::get_reference;
pub use service_info::service_info;

use crate::catalog::ResourceCatalog;
use axum::{Router, routing::get};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ResourceCatalog>,
}

/// Every route the server exposes. Tracing and CORS layers are added by
/// the caller.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/files", get(get_files))
        .route("/ref", get(get_reference))
        .route("/", get(service_info))
        .route("/service-info", get(service_info))
        .with_state(state)
}
