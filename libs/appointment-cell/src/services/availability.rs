// libs/appointment-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use professional_cell::models::TimeSlot;
use professional_cell::services::{CatalogStore, SlotGenerator};
use shared_models::error::SchedulingError;
use shared_utils::clock::Clock;

use crate::models::ServiceTotals;
use crate::services::conflict::mark_availability;
use crate::services::store::AppointmentStore;

/// Candidate slots marked against the professional's booked day.
/// Recomputed on every call.
pub struct AvailabilityService {
    slots: SlotGenerator,
    catalog: Arc<dyn CatalogStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl AvailabilityService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        appointments: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            slots: SlotGenerator::new(Arc::clone(&catalog), clock),
            catalog,
            appointments,
        }
    }

    pub async fn generate_available_slots(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<Vec<TimeSlot>, SchedulingError> {
        let candidates = self.slots.generate_slots(professional_id, date, duration_minutes).await?;
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let booked = self.appointments.list_for_day(professional_id, date).await?;
        debug!("Checking {} candidate slots against {} appointments", candidates.len(), booked.len());

        Ok(mark_availability(candidates, &booked))
    }

    /// Slots sized to the combined duration of `service_ids`.
    pub async fn slots_for_services(
        &self,
        professional_id: Uuid,
        service_ids: &[Uuid],
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, SchedulingError> {
        if service_ids.is_empty() {
            return Err(SchedulingError::validation("Select at least one service"));
        }

        let services = self.catalog.get_services(service_ids).await?;
        let totals = ServiceTotals::of(&services)?;
        self.generate_available_slots(professional_id, date, totals.duration_minutes).await
    }
}
