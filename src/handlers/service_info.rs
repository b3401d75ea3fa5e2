use crate::types::{CatalogSummary, ServiceInfo};
use axum::{Json, extract::State};
use super::AppState;

pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let catalog = &state.catalog;
    Json(ServiceInfo {
        id: "org.example.htscatalog".to_string(),
        name: "htscatalog".to_string(),
        description: Some("Indexed genomic track and reference file server".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog: CatalogSummary {
            groups: catalog.groups.len(),
            files: catalog.groups.values().map(|files| files.len()).sum(),
        },
    })
}
