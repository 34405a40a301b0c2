// libs/appointment-cell/src/services/supabase_store.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::SchedulingError;

use crate::models::{Appointment, StatusChange};
use crate::services::store::AppointmentStore;

/// Appointments in the `appointments` table.
///
/// The table is expected to carry an exclusion constraint over
/// `(professional_id, date, [start_time, end_time))` for non-cancelled rows;
/// its 409 is reported as `SlotUnavailable`.
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(SupabaseClient::new(config)))
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn list_for_day(&self, professional_id: Uuid, date: NaiveDate)
        -> Result<Vec<Appointment>, SchedulingError> {
        let path = format!(
            "/rest/v1/appointments?professional_id=eq.{}&date=eq.{}&order=start_time.asc",
            professional_id, date
        );
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None, None).await?;
        debug!("Fetched {} appointments for professional {} on {}", rows.len(), professional_id, date);
        Ok(rows)
    }

    async fn create(&self, appointment: &Appointment) -> Result<Appointment, SchedulingError> {
        let result: Result<Vec<Appointment>, _> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            None,
            Some(json!(appointment)),
            Some(SupabaseClient::prefer_representation()),
        ).await;

        let rows = match result {
            Ok(rows) => rows,
            Err(e) if e.is_conflict() => {
                warn!("Insert rejected by overlap constraint for professional {} on {}",
                      appointment.professional_id, appointment.date);
                return Err(SchedulingError::SlotUnavailable);
            }
            Err(e) => return Err(e.into()),
        };

        rows.into_iter().next().ok_or_else(|| {
            SchedulingError::OperationFailed("Appointment insert returned no row".to_string())
        })
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None, None).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SchedulingError::not_found(format!("Appointment {}", id)))
    }

    async fn update_status(&self, id: Uuid, change: StatusChange)
        -> Result<Appointment, SchedulingError> {
        let mut update = Map::new();
        update.insert("status".to_string(), json!(change.next));
        update.insert("updated_at".to_string(), json!(Utc::now()));
        if let Some(notes) = &change.notes {
            update.insert("notes".to_string(), json!(notes));
        }
        if let Some(reason) = &change.cancellation_reason {
            update.insert("cancellation_reason".to_string(), json!(reason));
        }

        // The status filter makes the PATCH a compare-and-set.
        let path = format!("/rest/v1/appointments?id=eq.{}&status=eq.{}", id, change.expected);
        let rows: Vec<Appointment> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            None,
            Some(Value::Object(update)),
            Some(SupabaseClient::prefer_representation()),
        ).await?;

        if let Some(updated) = rows.into_iter().next() {
            return Ok(updated);
        }

        // Nothing matched: either the row is gone or its status moved on.
        let current = self.get(id).await?;
        warn!("Status write for {} lost: stored status is {}", id, current.status);
        Err(SchedulingError::invalid_transition(current.status, change.next))
    }
}
