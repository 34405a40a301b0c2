// libs/appointment-cell/src/services/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::error::SchedulingError;

use crate::models::{Appointment, StatusChange};
use crate::services::conflict::find_conflicts;

/// Persistence contract for appointments.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Every appointment of the professional on `date`, cancelled ones included,
    /// ordered by start time.
    async fn list_for_day(&self, professional_id: Uuid, date: NaiveDate)
        -> Result<Vec<Appointment>, SchedulingError>;

    /// Inserts the appointment. A store that can detect an overlapping
    /// non-cancelled row fails with `SlotUnavailable`.
    async fn create(&self, appointment: &Appointment) -> Result<Appointment, SchedulingError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError>;

    /// Compare-and-set on status. Fails with `InvalidTransition` when the
    /// stored status is no longer `change.expected`.
    async fn update_status(&self, id: Uuid, change: StatusChange)
        -> Result<Appointment, SchedulingError>;
}

/// Applies a status change to a loaded appointment, checking the expected status.
pub(crate) fn apply_status_change(
    appointment: &mut Appointment,
    change: StatusChange,
) -> Result<(), SchedulingError> {
    if appointment.status != change.expected {
        warn!("Appointment {} is {} but {} was expected", appointment.id, appointment.status, change.expected);
        return Err(SchedulingError::invalid_transition(appointment.status, change.next));
    }

    appointment.status = change.next;
    if let Some(notes) = change.notes {
        appointment.notes = Some(notes);
    }
    if change.cancellation_reason.is_some() {
        appointment.cancellation_reason = change.cancellation_reason;
    }
    appointment.updated_at = Utc::now();
    Ok(())
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn list_for_day(&self, professional_id: Uuid, date: NaiveDate)
        -> Result<Vec<Appointment>, SchedulingError> {
        let mut day: Vec<Appointment> = self.appointments
            .read()
            .await
            .values()
            .filter(|a| a.professional_id == professional_id && a.date == date)
            .cloned()
            .collect();
        day.sort_by_key(|a| a.start_time);
        Ok(day)
    }

    async fn create(&self, appointment: &Appointment) -> Result<Appointment, SchedulingError> {
        let mut appointments = self.appointments.write().await;

        if appointments.contains_key(&appointment.id) {
            return Err(SchedulingError::OperationFailed(format!(
                "Appointment {} already exists", appointment.id
            )));
        }

        // Same guarantee a database exclusion constraint gives.
        let same_day: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.professional_id == appointment.professional_id && a.date == appointment.date)
            .cloned()
            .collect();
        if !find_conflicts(appointment.start_time, appointment.end_time, &same_day).is_empty() {
            warn!("Rejected overlapping insert for professional {} on {}",
                  appointment.professional_id, appointment.date);
            return Err(SchedulingError::SlotUnavailable);
        }

        appointments.insert(appointment.id, appointment.clone());
        debug!("Stored appointment {}", appointment.id);
        Ok(appointment.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.appointments
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| SchedulingError::not_found(format!("Appointment {}", id)))
    }

    async fn update_status(&self, id: Uuid, change: StatusChange)
        -> Result<Appointment, SchedulingError> {
        let mut appointments = self.appointments.write().await;
        let appointment = appointments
            .get_mut(&id)
            .ok_or_else(|| SchedulingError::not_found(format!("Appointment {}", id)))?;

        apply_status_change(appointment, change)?;
        Ok(appointment.clone())
    }
}
