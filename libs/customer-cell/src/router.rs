use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, CustomerState};
use crate::services::CustomerResolver;

pub fn customer_routes(config: Arc<AppConfig>, resolver: Arc<CustomerResolver>) -> Router {
    let state = CustomerState { resolver };

    Router::new()
        .route("/resolve", post(handlers::resolve_customer))
        .route("/{customer_id}", get(handlers::get_customer))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
