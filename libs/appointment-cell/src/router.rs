// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, AppointmentState};

pub fn appointment_routes(config: Arc<AppConfig>, state: AppointmentState) -> Router {
    Router::new()
        // Availability
        .route("/slots", get(handlers::get_available_slots))

        // Lifecycle
        .route("/", get(handlers::list_appointments).post(handlers::create_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))

        // Booking wizard sessions
        .route("/bookings", post(handlers::start_booking))
        .route("/bookings/{session_id}", get(handlers::get_booking).delete(handlers::abandon_booking))
        .route("/bookings/{session_id}/services", put(handlers::select_booking_services))
        .route("/bookings/{session_id}/professional", put(handlers::select_booking_professional))
        .route("/bookings/{session_id}/slots", get(handlers::get_booking_slots))
        .route("/bookings/{session_id}/slot", put(handlers::select_booking_slot))
        .route("/bookings/{session_id}/customer", put(handlers::set_booking_customer))
        .route("/bookings/{session_id}/advance", post(handlers::advance_booking))
        .route("/bookings/{session_id}/back", post(handlers::back_booking))
        .route("/bookings/{session_id}/commit", post(handlers::commit_booking))

        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
