use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use crate::{
    Error, Result,
    types::{FilesQuery, is_truthy},
};
use super::AppState;
use super::data::{content_type_for, serve_file};

/// `GET /files`: the ordered listing of every group, the listing of one
/// group with `key`, or a single file (or its index) with `key` and `file`.
pub async fn get_files(
    State(state): State<AppState>,
    Query(query): Query<FilesQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    match (query.key, query.file) {
        (None, None) => Ok(Json(state.catalog.ordered_listing()).into_response()),
        (Some(key), None) => Ok(Json(state.catalog.list_ordered_files(&key)?).into_response()),
        (Some(key), Some(file)) => {
            let want_index = is_truthy(query.index.as_deref());
            let path = state.catalog.resolve_file(&key, &file, want_index)?;
            serve_file(&path, content_type_for(&path), &headers).await
        }
        (None, Some(file)) => Err(Error::InvalidInput(format!(
            "file {file} requested without a key"
        ))),
    }
}
