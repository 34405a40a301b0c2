// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use customer_cell::services::CustomerResolver;
use professional_cell::services::CatalogStore;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_staff_for;

use crate::models::{
    BookingSlotsQuery, CancelAppointmentRequest, CompleteAppointmentRequest,
    CustomerInfoRequest, DayQuery, NewAppointment, SelectProfessionalRequest, SelectServicesRequest,
    SelectSlotRequest, SlotsQuery,
};
use crate::services::{
    AppointmentLifecycle, AvailabilityService, BookingSessions, BookingWorkflow,
};

#[derive(Clone)]
pub struct AppointmentState {
    pub lifecycle: Arc<AppointmentLifecycle>,
    pub availability: Arc<AvailabilityService>,
    pub customers: Arc<CustomerResolver>,
    pub catalog: Arc<dyn CatalogStore>,
    pub sessions: Arc<BookingSessions>,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<AppointmentState>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state.availability
        .generate_available_slots(query.professional_id, query.date, query.duration_minutes)
        .await?;

    Ok(Json(json!({
        "professional_id": query.professional_id,
        "date": query.date,
        "duration_minutes": query.duration_minutes,
        "slots": slots
    })))
}

// ==============================================================================
// APPOINTMENT LIFECYCLE
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Value>, AppError> {
    require_staff_for(&user, &query.professional_id.to_string())?;

    let appointments = state.lifecycle.list_for_day(query.professional_id, query.date).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Json(request): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_staff_for(&user, &request.professional_id.to_string())?;

    let appointment = state.lifecycle.create(request).await?;
    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.lifecycle.get(appointment_id).await?;
    require_staff_for(&user, &appointment.professional_id.to_string())?;

    Ok(Json(json!({
        "appointment": appointment,
        "valid_transitions": AppointmentLifecycle::valid_transitions(appointment.status)
    })))
}

async fn authorize_for_appointment(
    state: &AppointmentState,
    user: &User,
    appointment_id: Uuid,
) -> Result<(), AppError> {
    let appointment = state.lifecycle.get(appointment_id).await?;
    require_staff_for(user, &appointment.professional_id.to_string())
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    authorize_for_appointment(&state, &user, appointment_id).await?;

    let appointment = state.lifecycle.confirm(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    authorize_for_appointment(&state, &user, appointment_id).await?;

    let appointment = state.lifecycle.complete(appointment_id, request.notes).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    authorize_for_appointment(&state, &user, appointment_id).await?;

    let appointment = state.lifecycle.cancel(appointment_id, request.reason).await?;
    Ok(Json(json!(appointment)))
}

// ==============================================================================
// BOOKING SESSIONS
// ==============================================================================

fn session_view(session_id: Uuid, workflow: &BookingWorkflow) -> Value {
    json!({
        "session_id": session_id,
        "step": workflow.step(),
        "draft": workflow.draft(),
        "appointment_id": workflow.appointment_id()
    })
}

#[axum::debug_handler]
pub async fn start_booking(
    State(state): State<AppointmentState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (session_id, workflow) = state.sessions.start().await;
    let workflow = workflow.lock().await;
    Ok((StatusCode::CREATED, Json(session_view(session_id, &workflow))))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let workflow = workflow.lock().await;
    Ok(Json(session_view(session_id, &workflow)))
}

#[axum::debug_handler]
pub async fn abandon_booking(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.abandon(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn select_booking_services(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectServicesRequest>,
) -> Result<Json<Value>, AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let mut workflow = workflow.lock().await;

    // Unknown services fail here rather than at commit.
    state.catalog.get_services(&request.service_ids).await?;
    workflow.select_services(request.service_ids)?;

    Ok(Json(session_view(session_id, &workflow)))
}

#[axum::debug_handler]
pub async fn select_booking_professional(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectProfessionalRequest>,
) -> Result<Json<Value>, AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let mut workflow = workflow.lock().await;

    let professional = state.catalog.get_professional(request.professional_id).await?;
    workflow.select_professional(&professional)?;

    Ok(Json(session_view(session_id, &workflow)))
}

#[axum::debug_handler]
pub async fn get_booking_slots(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<BookingSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let workflow = workflow.lock().await;

    let slots = workflow.available_slots(query.date, &state.availability).await?;

    Ok(Json(json!({
        "session_id": session_id,
        "date": query.date,
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn select_booking_slot(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let mut workflow = workflow.lock().await;

    let slots = workflow.available_slots(request.date, &state.availability).await?;
    workflow.select_date_time(request.date, request.start_time, &slots)?;

    Ok(Json(session_view(session_id, &workflow)))
}

#[axum::debug_handler]
pub async fn set_booking_customer(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CustomerInfoRequest>,
) -> Result<Json<Value>, AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let mut workflow = workflow.lock().await;

    workflow.set_customer_info(request.name, request.phone, request.email, request.notes)?;

    Ok(Json(session_view(session_id, &workflow)))
}

#[axum::debug_handler]
pub async fn advance_booking(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let mut workflow = workflow.lock().await;

    workflow.advance()?;
    Ok(Json(session_view(session_id, &workflow)))
}

#[axum::debug_handler]
pub async fn back_booking(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let mut workflow = workflow.lock().await;

    workflow.back()?;
    Ok(Json(session_view(session_id, &workflow)))
}

#[axum::debug_handler]
pub async fn commit_booking(
    State(state): State<AppointmentState>,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let workflow = state.sessions.get(session_id).await?;
    let mut workflow = workflow.lock().await;

    let appointment = workflow.commit(&state.customers, &state.lifecycle).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "session_id": session_id,
        "step": workflow.step(),
        "appointment": appointment
    }))))
}
