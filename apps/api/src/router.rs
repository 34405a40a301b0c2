use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::{appointment_routes, AppointmentState};
use customer_cell::customer_routes;
use professional_cell::catalog_routes;
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>, state: AppointmentState) -> Router {
    Router::new()
        .route("/", get(|| async { "Booking API is running!" }))
        .nest("/catalog", catalog_routes(config.clone(), state.catalog.clone()))
        .nest("/customers", customer_routes(config.clone(), state.customers.clone()))
        .nest("/appointments", appointment_routes(config, state))
}
