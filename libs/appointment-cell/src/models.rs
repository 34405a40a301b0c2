// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use professional_cell::models::Service;
use shared_models::error::SchedulingError;

// ==============================================================================
// APPOINTMENT
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub customer_id: Uuid,
    pub professional_id: Uuid,
    pub service_ids: Vec<Uuid>,
    /// Sum of service prices at creation. Never recomputed.
    pub total_price: f64,
    pub notes: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether the appointment still holds its interval on the calendar.
    pub fn blocks_calendar(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl AppointmentStatus {
    /// Statuses reachable in one step. Terminal statuses have none.
    pub fn valid_transitions(self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Pending => &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled],
            AppointmentStatus::Confirmed => &[AppointmentStatus::Completed, AppointmentStatus::Cancelled],
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }
}

/// A guarded status write. Applied only while the stored status is still `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub expected: AppointmentStatus,
    pub next: AppointmentStatus,
    /// Replaces the stored notes when set.
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl StatusChange {
    pub fn new(expected: AppointmentStatus, next: AppointmentStatus) -> Self {
        Self { expected, next, notes: None, cancellation_reason: None }
    }
}

// ==============================================================================
// CREATION
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub customer_id: Uuid,
    pub professional_id: Uuid,
    pub service_ids: Vec<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Total duration and price of an ordered service selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceTotals {
    pub duration_minutes: u32,
    pub price: f64,
}

impl ServiceTotals {
    /// Fails when the combined duration does not fit in a `u32`.
    pub fn of(services: &[Service]) -> Result<Self, SchedulingError> {
        services.iter().try_fold(
            Self { duration_minutes: 0, price: 0.0 },
            |acc, service| {
                let duration_minutes = acc.duration_minutes
                    .checked_add(service.duration_minutes)
                    .ok_or_else(|| SchedulingError::validation("Selected services are too long to book"))?;
                Ok(Self {
                    duration_minutes,
                    price: acc.price + service.price,
                })
            },
        )
    }

    /// End of an interval starting at `start`. Fails when it would run past midnight.
    pub fn end_from(&self, start: NaiveTime) -> Result<NaiveTime, SchedulingError> {
        let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(i64::from(self.duration_minutes)));
        if wrapped != 0 {
            return Err(SchedulingError::validation(format!(
                "Appointment starting at {} would run past midnight", start
            )));
        }
        Ok(end)
    }
}

// ==============================================================================
// REQUEST / QUERY TYPES
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct DayQuery {
    pub professional_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectServicesRequest {
    pub service_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectProfessionalRequest {
    pub professional_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingSlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectSlotRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerInfoRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}
