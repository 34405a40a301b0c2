use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, CatalogState};
use crate::services::catalog::CatalogStore;

pub fn catalog_routes(config: Arc<AppConfig>, catalog: Arc<dyn CatalogStore>) -> Router {
    let state = CatalogState { catalog };

    Router::new()
        .route("/professionals", get(handlers::list_professionals))
        .route("/professionals/{professional_id}", get(handlers::get_professional))
        .route("/services", get(handlers::list_services))
        .route("/services/{service_id}", get(handlers::get_service))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
