// libs/appointment-cell/src/services/workflow.rs
use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use customer_cell::normalize_phone;
use customer_cell::services::CustomerResolver;
use professional_cell::models::{Professional, TimeSlot};
use shared_models::error::SchedulingError;

use crate::models::{Appointment, NewAppointment};
use crate::services::availability::AvailabilityService;
use crate::services::lifecycle::AppointmentLifecycle;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    SelectServices,
    SelectProfessional,
    SelectDateTime,
    EnterCustomerInfo,
    Confirm,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStep::SelectServices => write!(f, "select_services"),
            BookingStep::SelectProfessional => write!(f, "select_professional"),
            BookingStep::SelectDateTime => write!(f, "select_date_time"),
            BookingStep::EnterCustomerInfo => write!(f, "enter_customer_info"),
            BookingStep::Confirm => write!(f, "confirm"),
        }
    }
}

impl BookingStep {
    pub fn next(self) -> Option<BookingStep> {
        match self {
            BookingStep::SelectServices => Some(BookingStep::SelectProfessional),
            BookingStep::SelectProfessional => Some(BookingStep::SelectDateTime),
            BookingStep::SelectDateTime => Some(BookingStep::EnterCustomerInfo),
            BookingStep::EnterCustomerInfo => Some(BookingStep::Confirm),
            BookingStep::Confirm => None,
        }
    }

    pub fn previous(self) -> Option<BookingStep> {
        match self {
            BookingStep::SelectServices => None,
            BookingStep::SelectProfessional => Some(BookingStep::SelectServices),
            BookingStep::SelectDateTime => Some(BookingStep::SelectProfessional),
            BookingStep::EnterCustomerInfo => Some(BookingStep::SelectDateTime),
            BookingStep::Confirm => Some(BookingStep::EnterCustomerInfo),
        }
    }
}

/// Unpersisted selections of one booking session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingDraft {
    pub service_ids: Vec<Uuid>,
    pub professional_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
}

impl BookingDraft {
    fn clear_date_time(&mut self) {
        self.date = None;
        self.start_time = None;
    }

    /// Whether the draft carries what leaving `step` requires.
    fn check_complete_for(&self, step: BookingStep) -> Result<(), SchedulingError> {
        match step {
            BookingStep::SelectServices if self.service_ids.is_empty() => {
                Err(SchedulingError::validation("Select at least one service"))
            }
            BookingStep::SelectProfessional if self.professional_id.is_none() => {
                Err(SchedulingError::validation("Select a professional"))
            }
            BookingStep::SelectDateTime if self.date.is_none() || self.start_time.is_none() => {
                Err(SchedulingError::validation("Select a date and an available time"))
            }
            BookingStep::EnterCustomerInfo
                if self.customer_name.trim().is_empty() || self.customer_phone.trim().is_empty() =>
            {
                Err(SchedulingError::validation("Name and phone are required"))
            }
            BookingStep::EnterCustomerInfo => normalize_phone(&self.customer_phone).map(|_| ()),
            _ => Ok(()),
        }
    }
}

/// The five-step booking wizard as a plain value.
///
/// Edits are accepted only at the step that owns the field. Once committed the
/// workflow is read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingWorkflow {
    step: BookingStep,
    draft: BookingDraft,
    appointment_id: Option<Uuid>,
}

impl Default for BookingWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingWorkflow {
    pub fn new() -> Self {
        Self {
            step: BookingStep::SelectServices,
            draft: BookingDraft::default(),
            appointment_id: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn appointment_id(&self) -> Option<Uuid> {
        self.appointment_id
    }

    pub fn is_committed(&self) -> bool {
        self.appointment_id.is_some()
    }

    fn ensure_editable(&self, action: &str) -> Result<(), SchedulingError> {
        if self.is_committed() {
            return Err(SchedulingError::invalid_transition("committed", action));
        }
        Ok(())
    }

    fn ensure_at(&self, step: BookingStep, action: &str) -> Result<(), SchedulingError> {
        self.ensure_editable(action)?;
        if self.step != step {
            return Err(SchedulingError::invalid_transition(self.step, action));
        }
        Ok(())
    }

    // ==========================================================================
    // NAVIGATION
    // ==========================================================================

    /// Moves forward when the current step's requirement holds. A failed
    /// requirement leaves the step unchanged.
    pub fn advance(&mut self) -> Result<BookingStep, SchedulingError> {
        self.ensure_editable("next step")?;
        let next = self.step
            .next()
            .ok_or_else(|| SchedulingError::invalid_transition(self.step, "next step"))?;

        self.draft.check_complete_for(self.step)?;

        debug!("Booking advanced {} -> {}", self.step, next);
        self.step = next;
        Ok(next)
    }

    /// Moves back one step. Selections are kept.
    pub fn back(&mut self) -> Result<BookingStep, SchedulingError> {
        self.ensure_editable("previous step")?;
        let previous = self.step
            .previous()
            .ok_or_else(|| SchedulingError::invalid_transition(self.step, "previous step"))?;

        debug!("Booking moved back {} -> {}", self.step, previous);
        self.step = previous;
        Ok(previous)
    }

    // ==========================================================================
    // DRAFT EDITS
    // ==========================================================================

    /// Replaces the service selection. A different selection drops the chosen
    /// professional and time.
    pub fn select_services(&mut self, service_ids: Vec<Uuid>) -> Result<(), SchedulingError> {
        self.ensure_at(BookingStep::SelectServices, "select services")?;

        let mut seen = HashSet::new();
        if !service_ids.iter().all(|id| seen.insert(*id)) {
            return Err(SchedulingError::validation("Services must not repeat"));
        }

        if self.draft.service_ids != service_ids {
            self.draft.professional_id = None;
            self.draft.clear_date_time();
        }
        self.draft.service_ids = service_ids;
        Ok(())
    }

    pub fn select_professional(&mut self, professional: &Professional) -> Result<(), SchedulingError> {
        self.ensure_at(BookingStep::SelectProfessional, "select professional")?;

        if !professional.offers_all(&self.draft.service_ids) {
            return Err(SchedulingError::validation(format!(
                "{} does not offer every selected service", professional.name
            )));
        }

        if self.draft.professional_id != Some(professional.id) {
            self.draft.clear_date_time();
        }
        self.draft.professional_id = Some(professional.id);
        Ok(())
    }

    /// Accepts `start_time` only when it begins one of `available_slots`.
    pub fn select_date_time(
        &mut self,
        date: NaiveDate,
        start_time: NaiveTime,
        available_slots: &[TimeSlot],
    ) -> Result<(), SchedulingError> {
        self.ensure_at(BookingStep::SelectDateTime, "select date and time")?;

        let offered = available_slots
            .iter()
            .any(|slot| slot.is_available && slot.start_time == start_time);
        if !offered {
            return Err(SchedulingError::validation(format!(
                "{} on {} is not an available slot", start_time, date
            )));
        }

        self.draft.date = Some(date);
        self.draft.start_time = Some(start_time);
        Ok(())
    }

    pub fn set_customer_info(
        &mut self,
        name: String,
        phone: String,
        email: Option<String>,
        notes: Option<String>,
    ) -> Result<(), SchedulingError> {
        self.ensure_at(BookingStep::EnterCustomerInfo, "enter customer info")?;

        self.draft.customer_name = name.trim().to_string();
        self.draft.customer_phone = phone.trim().to_string();
        self.draft.customer_email = email;
        self.draft.notes = notes;
        Ok(())
    }

    // ==========================================================================
    // QUERIES AND COMMIT
    // ==========================================================================

    /// Slots on `date` for the selected professional, sized to the selected services.
    pub async fn available_slots(
        &self,
        date: NaiveDate,
        availability: &AvailabilityService,
    ) -> Result<Vec<TimeSlot>, SchedulingError> {
        let professional_id = self.draft
            .professional_id
            .ok_or_else(|| SchedulingError::validation("Select a professional first"))?;

        availability
            .slots_for_services(professional_id, &self.draft.service_ids, date)
            .await
    }

    /// Resolves the customer and creates the appointment. On failure the
    /// workflow stays at `Confirm` with the draft untouched.
    pub async fn commit(
        &mut self,
        customers: &CustomerResolver,
        lifecycle: &AppointmentLifecycle,
    ) -> Result<Appointment, SchedulingError> {
        self.ensure_at(BookingStep::Confirm, "commit")?;

        for step in [
            BookingStep::SelectServices,
            BookingStep::SelectProfessional,
            BookingStep::SelectDateTime,
            BookingStep::EnterCustomerInfo,
        ] {
            self.draft.check_complete_for(step)?;
        }

        let (professional_id, date, start_time) =
            match (self.draft.professional_id, self.draft.date, self.draft.start_time) {
                (Some(p), Some(d), Some(t)) => (p, d, t),
                _ => return Err(SchedulingError::validation("Booking draft is incomplete")),
            };

        let customer = customers
            .resolve(
                &self.draft.customer_phone,
                &self.draft.customer_name,
                self.draft.customer_email.as_deref(),
            )
            .await?;

        let request = NewAppointment {
            customer_id: customer.id,
            professional_id,
            service_ids: self.draft.service_ids.clone(),
            date,
            start_time,
            notes: self.draft.notes.clone(),
        };

        match lifecycle.create(request).await {
            Ok(appointment) => {
                info!("Booking committed as appointment {}", appointment.id);
                self.appointment_id = Some(appointment.id);
                Ok(appointment)
            }
            Err(e) => {
                warn!("Booking commit failed, staying at confirm: {}", e);
                Err(e)
            }
        }
    }
}
