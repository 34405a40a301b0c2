// libs/professional-cell/src/services/slots.rs
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use shared_models::error::SchedulingError;
use shared_utils::clock::Clock;

use crate::models::{TimeSlot, WorkHours, WorkWeek};
use crate::services::catalog::CatalogStore;

/// Back-to-back intervals of a fixed length inside one work window.
///
/// Cloning restarts the sequence from the same point.
#[derive(Debug, Clone)]
pub struct SlotSteps {
    next_start: Option<NaiveTime>,
    window_end: NaiveTime,
    step: Duration,
}

impl SlotSteps {
    pub fn new(hours: &WorkHours, duration_minutes: u32) -> Self {
        let next_start = (hours.enabled && duration_minutes > 0).then_some(hours.start_time);
        Self {
            next_start,
            window_end: hours.end_time,
            step: Duration::minutes(i64::from(duration_minutes)),
        }
    }
}

impl Iterator for SlotSteps {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        let start = self.next_start.take()?;
        let (end, wrapped_seconds) = start.overflowing_add_signed(self.step);

        // A slot past the window end (or past midnight) is dropped, not truncated.
        if wrapped_seconds != 0 || end > self.window_end {
            return None;
        }

        self.next_start = Some(end);
        Some(TimeSlot::new(start, end))
    }
}

/// Candidate slots for one date. Empty when the weekday is closed or the
/// date is before `today`.
pub fn generate_slots(
    work_week: &WorkWeek,
    date: NaiveDate,
    today: NaiveDate,
    duration_minutes: u32,
) -> Result<Vec<TimeSlot>, SchedulingError> {
    if duration_minutes == 0 {
        return Err(SchedulingError::validation("Slot duration must be greater than zero"));
    }

    if date < today {
        debug!("No slots for past date {}", date);
        return Ok(Vec::new());
    }

    let hours = work_week.hours_on(date);
    if !hours.enabled {
        debug!("Work hours disabled on {} ({})", date, chrono::Datelike::weekday(&date));
        return Ok(Vec::new());
    }

    Ok(SlotSteps::new(hours, duration_minutes).collect())
}

/// Slot generation against the catalog's stored work hours.
pub struct SlotGenerator {
    catalog: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
}

impl SlotGenerator {
    pub fn new(catalog: Arc<dyn CatalogStore>, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }

    pub async fn generate_slots(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<Vec<TimeSlot>, SchedulingError> {
        let professional = self.catalog.get_professional(professional_id).await?;
        let slots = generate_slots(
            &professional.work_hours,
            date,
            self.clock.today(),
            duration_minutes,
        )?;

        debug!("Generated {} candidate slots for professional {} on {}",
               slots.len(), professional_id, date);
        Ok(slots)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
