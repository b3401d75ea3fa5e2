use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use crate::{
    Result,
    types::{ReferenceQuery, is_truthy},
};
use super::AppState;
use super::data::serve_file;

/// `GET /ref`: the annotation or the FASTA reference, or their indexes.
pub async fn get_reference(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let want_index = is_truthy(query.index.as_deref());
    let path = state.catalog.resolve_reference(query.filetype, want_index);

    let content_type = if want_index {
        "application/octet-stream"
    } else {
        query.filetype.content_type()
    };
    serve_file(&path, content_type, &headers).await
}
