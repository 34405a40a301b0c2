// libs/professional-cell/src/models.rs
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::SchedulingError;

// ==============================================================================
// SERVICE CATALOG
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Longest a single service may last.
pub const MAX_SERVICE_MINUTES: u32 = 24 * 60;

impl Service {
    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.name.trim().is_empty() {
            return Err(SchedulingError::validation("Service name must not be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(SchedulingError::validation(format!(
                "Service {} has an invalid price: {}", self.id, self.price
            )));
        }
        if self.duration_minutes == 0 || self.duration_minutes > MAX_SERVICE_MINUTES {
            return Err(SchedulingError::validation(format!(
                "Service {} must last between 1 and {} minutes", self.id, MAX_SERVICE_MINUTES
            )));
        }
        Ok(())
    }
}

// ==============================================================================
// WORK HOURS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkHours {
    pub enabled: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Default for WorkHours {
    fn default() -> Self {
        Self::closed()
    }
}

impl WorkHours {
    pub fn closed() -> Self {
        Self {
            enabled: false,
            start_time: NaiveTime::default(),
            end_time: NaiveTime::default(),
        }
    }

    pub fn open(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self { enabled: true, start_time, end_time }
    }

    /// Whether `[start, end)` fits inside the window. Closed days contain nothing.
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.enabled && start < end && self.start_time <= start && end <= self.end_time
    }
}

/// One `WorkHours` per weekday. Days missing from stored data are closed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkWeek {
    #[serde(default)]
    pub monday: WorkHours,
    #[serde(default)]
    pub tuesday: WorkHours,
    #[serde(default)]
    pub wednesday: WorkHours,
    #[serde(default)]
    pub thursday: WorkHours,
    #[serde(default)]
    pub friday: WorkHours,
    #[serde(default)]
    pub saturday: WorkHours,
    #[serde(default)]
    pub sunday: WorkHours,
}

impl WorkWeek {
    /// Same hours on each of `days`, every other day closed.
    pub fn uniform(days: &[Weekday], hours: WorkHours) -> Self {
        let mut week = Self::default();
        for day in days {
            *week.hours_for_mut(*day) = hours;
        }
        week
    }

    pub fn hours_for(&self, weekday: Weekday) -> &WorkHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn hours_for_mut(&mut self, weekday: Weekday) -> &mut WorkHours {
        match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }

    pub fn hours_on(&self, date: NaiveDate) -> &WorkHours {
        self.hours_for(date.weekday())
    }
}

// ==============================================================================
// PROFESSIONALS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Professional {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub service_ids: Vec<Uuid>,
    #[serde(default)]
    pub work_hours: WorkWeek,
}

impl Professional {
    pub fn offers(&self, service_id: Uuid) -> bool {
        self.service_ids.contains(&service_id)
    }

    pub fn offers_all(&self, service_ids: &[Uuid]) -> bool {
        service_ids.iter().all(|id| self.offers(*id))
    }
}

// ==============================================================================
// SLOTS
// ==============================================================================

/// A candidate interval. Derived per query and never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl TimeSlot {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self { start_time, end_time, is_available: true }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotQuery {
    pub professional_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: u32,
}

/// File/seed format for the in-memory catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub professionals: Vec<Professional>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn missing_weekdays_deserialize_as_closed() {
        let week: WorkWeek = serde_json::from_value(serde_json::json!({
            "monday": {"enabled": true, "start_time": "09:00:00", "end_time": "17:00:00"}
        }))
        .unwrap();

        assert!(week.monday.enabled);
        assert_eq!(week.monday.start_time, time(9, 0));
        assert!(!week.sunday.enabled);
    }

    #[test]
    fn work_window_containment_is_inclusive_of_edges() {
        let hours = WorkHours::open(time(9, 0), time(19, 0));
        assert!(hours.contains(time(9, 0), time(9, 30)));
        assert!(hours.contains(time(18, 30), time(19, 0)));
        assert!(!hours.contains(time(18, 45), time(19, 15)));
        assert!(!WorkHours::closed().contains(time(9, 0), time(9, 30)));
    }

    #[test]
    fn rejects_negative_price_and_zero_duration() {
        let mut service = Service {
            id: Uuid::new_v4(),
            name: "Haircut".to_string(),
            price: 25.0,
            duration_minutes: 30,
            is_active: true,
        };
        assert!(service.validate().is_ok());

        service.price = -1.0;
        assert!(service.validate().is_err());

        service.price = 25.0;
        service.duration_minutes = 0;
        assert!(service.validate().is_err());

        service.duration_minutes = MAX_SERVICE_MINUTES;
        assert!(service.validate().is_ok());
        service.duration_minutes = MAX_SERVICE_MINUTES + 1;
        assert!(service.validate().is_err());
    }
}
