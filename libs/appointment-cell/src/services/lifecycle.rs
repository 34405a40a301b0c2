// libs/appointment-cell/src/services/lifecycle.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use customer_cell::services::CustomerStore;
use professional_cell::services::CatalogStore;
use shared_models::error::SchedulingError;
use shared_utils::clock::Clock;

use crate::models::{Appointment, AppointmentStatus, NewAppointment, ServiceTotals, StatusChange};
use crate::services::conflict::find_conflicts;
use crate::services::consistency::SlotLocks;
use crate::services::store::AppointmentStore;

/// The only writer of appointments.
pub struct AppointmentLifecycle {
    appointments: Arc<dyn AppointmentStore>,
    customers: Arc<dyn CustomerStore>,
    catalog: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
    locks: SlotLocks,
}

impl AppointmentLifecycle {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        customers: Arc<dyn CustomerStore>,
        catalog: Arc<dyn CatalogStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            customers,
            catalog,
            clock,
            locks: SlotLocks::new(),
        }
    }

    /// Books an appointment in `Pending`.
    ///
    /// Everything is validated before the day lock is taken. Under the lock the
    /// interval is checked again against the stored day, so of two racing
    /// requests for overlapping intervals one gets `SlotUnavailable`.
    #[instrument(skip(self, request), fields(professional_id = %request.professional_id, date = %request.date))]
    pub async fn create(&self, request: NewAppointment) -> Result<Appointment, SchedulingError> {
        if request.service_ids.is_empty() {
            return Err(SchedulingError::validation("An appointment needs at least one service"));
        }
        let mut seen = HashSet::new();
        if !request.service_ids.iter().all(|id| seen.insert(*id)) {
            return Err(SchedulingError::validation("Services must not repeat"));
        }

        let professional = self.catalog.get_professional(request.professional_id).await?;
        let services = self.catalog.get_services(&request.service_ids).await?;

        if let Some(inactive) = services.iter().find(|s| !s.is_active) {
            return Err(SchedulingError::validation(format!("Service {} is not active", inactive.name)));
        }
        if let Some(unoffered) = services.iter().find(|s| !professional.offers(s.id)) {
            return Err(SchedulingError::validation(format!(
                "{} does not offer {}", professional.name, unoffered.name
            )));
        }

        let totals = ServiceTotals::of(&services)?;
        let end_time = totals.end_from(request.start_time)?;

        if request.date < self.clock.today() {
            return Err(SchedulingError::validation(format!("{} is in the past", request.date)));
        }
        if !professional.work_hours.hours_on(request.date).contains(request.start_time, end_time) {
            return Err(SchedulingError::validation(format!(
                "{}-{} on {} is outside {}'s work hours",
                request.start_time, end_time, request.date, professional.name
            )));
        }

        // Fails NotFound before anything is written.
        self.customers.get(request.customer_id).await?;

        let _day = self.locks.acquire(request.professional_id, request.date).await;

        let booked = self.appointments.list_for_day(request.professional_id, request.date).await?;
        let conflicts = find_conflicts(request.start_time, end_time, &booked);
        if !conflicts.is_empty() {
            warn!("{}-{} overlaps {} existing appointment(s)", request.start_time, end_time, conflicts.len());
            return Err(SchedulingError::SlotUnavailable);
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            date: request.date,
            start_time: request.start_time,
            end_time,
            status: AppointmentStatus::Pending,
            customer_id: request.customer_id,
            professional_id: request.professional_id,
            service_ids: request.service_ids,
            total_price: totals.price,
            notes: request.notes,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.appointments.create(&appointment).await?;

        // The booking stands even if the counter write fails.
        if let Err(e) = self.customers.increment_total_appointments(created.customer_id).await {
            error!("Failed to bump appointment count for customer {}: {}", created.customer_id, e);
        }

        info!("Created appointment {} ({}-{})", created.id, created.start_time, created.end_time);
        Ok(created)
    }

    pub async fn confirm(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.transition(id, AppointmentStatus::Confirmed, None, None).await
    }

    /// Replaces the notes when `notes` is given.
    pub async fn complete(&self, id: Uuid, notes: Option<String>) -> Result<Appointment, SchedulingError> {
        self.transition(id, AppointmentStatus::Completed, notes, None).await
    }

    pub async fn cancel(&self, id: Uuid, reason: Option<String>) -> Result<Appointment, SchedulingError> {
        self.transition(id, AppointmentStatus::Cancelled, None, reason).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.appointments.get(id).await
    }

    pub async fn list_for_day(&self, professional_id: Uuid, date: NaiveDate)
        -> Result<Vec<Appointment>, SchedulingError> {
        self.appointments.list_for_day(professional_id, date).await
    }

    pub fn valid_transitions(status: AppointmentStatus) -> &'static [AppointmentStatus] {
        status.valid_transitions()
    }

    async fn transition(
        &self,
        id: Uuid,
        next: AppointmentStatus,
        notes: Option<String>,
        cancellation_reason: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        let current = self.appointments.get(id).await?;

        if !current.status.can_transition_to(next) {
            warn!("Rejected transition of {} from {} to {}", id, current.status, next);
            return Err(SchedulingError::invalid_transition(current.status, next));
        }

        let change = StatusChange {
            expected: current.status,
            next,
            notes,
            cancellation_reason,
        };
        let updated = self.appointments.update_status(id, change).await?;

        info!("Appointment {} moved {} -> {}", id, current.status, updated.status);
        Ok(updated)
    }
}
