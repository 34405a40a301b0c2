use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_any_staff;

use crate::models::ResolveCustomerRequest;
use crate::services::CustomerResolver;

#[derive(Clone)]
pub struct CustomerState {
    pub resolver: Arc<CustomerResolver>,
}

#[axum::debug_handler]
pub async fn get_customer(
    State(state): State<CustomerState>,
    Extension(user): Extension<User>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_any_staff(&user)?;

    let customer = state.resolver.get(customer_id).await?;
    Ok(Json(json!(customer)))
}

#[axum::debug_handler]
pub async fn resolve_customer(
    State(state): State<CustomerState>,
    Extension(user): Extension<User>,
    Json(request): Json<ResolveCustomerRequest>,
) -> Result<Json<Value>, AppError> {
    require_any_staff(&user)?;

    let customer = state.resolver
        .resolve(&request.phone, &request.name, request.email.as_deref())
        .await?;

    Ok(Json(json!(customer)))
}
