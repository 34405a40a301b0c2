use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::services::catalog::CatalogStore;

#[derive(Clone)]
pub struct CatalogState {
    pub catalog: Arc<dyn CatalogStore>,
}

// ==============================================================================
// CATALOG HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_professionals(
    State(state): State<CatalogState>,
) -> Result<Json<Value>, AppError> {
    let professionals = state.catalog.list_professionals().await?;

    Ok(Json(json!({
        "professionals": professionals,
        "total": professionals.len()
    })))
}

#[axum::debug_handler]
pub async fn get_professional(
    State(state): State<CatalogState>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let professional = state.catalog.get_professional(professional_id).await?;
    Ok(Json(json!(professional)))
}

/// Only services currently offered.
#[axum::debug_handler]
pub async fn list_services(
    State(state): State<CatalogState>,
) -> Result<Json<Value>, AppError> {
    let services: Vec<_> = state.catalog
        .list_services()
        .await?
        .into_iter()
        .filter(|service| service.is_active)
        .collect();

    debug!("Listing {} active services", services.len());

    Ok(Json(json!({
        "services": services,
        "total": services.len()
    })))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<CatalogState>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = state.catalog.get_service(service_id).await?;
    Ok(Json(json!(service)))
}
