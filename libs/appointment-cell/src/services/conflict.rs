// libs/appointment-cell/src/services/conflict.rs
use chrono::NaiveTime;
use tracing::debug;

use professional_cell::models::TimeSlot;

use crate::models::Appointment;

/// Half-open overlap: `[s1, e1)` and `[s2, e2)` conflict iff `s1 < e2 && s2 < e1`.
/// Back-to-back intervals do not conflict.
pub fn appointments_overlap(
    start1: NaiveTime,
    end1: NaiveTime,
    start2: NaiveTime,
    end2: NaiveTime,
) -> bool {
    start1 < end2 && start2 < end1
}

/// Non-cancelled appointments overlapping `[start, end)`.
///
/// `appointments` are expected to belong to one professional and date.
pub fn find_conflicts<'a>(
    start: NaiveTime,
    end: NaiveTime,
    appointments: &'a [Appointment],
) -> Vec<&'a Appointment> {
    appointments
        .iter()
        .filter(|appointment| appointment.blocks_calendar())
        .filter(|appointment| appointments_overlap(start, end, appointment.start_time, appointment.end_time))
        .collect()
}

/// Sets `is_available` on each slot against the existing appointments.
pub fn mark_availability(slots: Vec<TimeSlot>, appointments: &[Appointment]) -> Vec<TimeSlot> {
    let blocking: Vec<&Appointment> = appointments.iter().filter(|a| a.blocks_calendar()).collect();

    let marked: Vec<TimeSlot> = slots
        .into_iter()
        .map(|slot| TimeSlot {
            is_available: !blocking.iter().any(|appointment| {
                appointments_overlap(slot.start_time, slot.end_time, appointment.start_time, appointment.end_time)
            }),
            ..slot
        })
        .collect();

    debug!(
        "Marked {} slots against {} blocking appointments, {} available",
        marked.len(),
        blocking.len(),
        marked.iter().filter(|s| s.is_available).count()
    );
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::models::AppointmentStatus;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn appointment(start: NaiveTime, end: NaiveTime, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            start_time: start,
            end_time: end,
            status,
            customer_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            service_ids: vec![Uuid::new_v4()],
            total_price: 30.0,
            notes: None,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overlap_is_half_open() {
        assert!(appointments_overlap(time(9, 0), time(10, 0), time(9, 30), time(10, 30)));
        assert!(appointments_overlap(time(9, 0), time(12, 0), time(10, 0), time(11, 0)));
        assert!(!appointments_overlap(time(9, 0), time(10, 0), time(10, 0), time(11, 0)));
        assert!(!appointments_overlap(time(10, 0), time(11, 0), time(9, 0), time(10, 0)));
    }

    #[test]
    fn only_the_booked_slot_is_unavailable() {
        let slots = vec![
            TimeSlot::new(time(13, 30), time(14, 0)),
            TimeSlot::new(time(14, 0), time(14, 30)),
            TimeSlot::new(time(14, 30), time(15, 0)),
        ];
        let booked = vec![appointment(time(14, 0), time(14, 30), AppointmentStatus::Confirmed)];

        let marked = mark_availability(slots, &booked);
        let availability: Vec<bool> = marked.iter().map(|s| s.is_available).collect();
        assert_eq!(availability, vec![true, false, true]);
    }

    #[test]
    fn cancelled_appointments_free_their_interval() {
        let slots = vec![TimeSlot::new(time(14, 0), time(14, 30))];
        let existing = vec![appointment(time(14, 0), time(14, 30), AppointmentStatus::Cancelled)];

        assert!(mark_availability(slots, &existing)[0].is_available);
        assert!(find_conflicts(time(14, 0), time(14, 30), &existing).is_empty());
    }

    #[test]
    fn long_appointments_block_every_slot_they_touch() {
        let slots = vec![
            TimeSlot::new(time(9, 0), time(9, 30)),
            TimeSlot::new(time(9, 30), time(10, 0)),
            TimeSlot::new(time(10, 0), time(10, 30)),
        ];
        let existing = vec![appointment(time(9, 15), time(10, 0), AppointmentStatus::Pending)];

        let availability: Vec<bool> = mark_availability(slots, &existing).iter().map(|s| s.is_available).collect();
        assert_eq!(availability, vec![false, false, true]);
    }

    #[test]
    fn find_conflicts_returns_each_overlapping_appointment() {
        let existing = vec![
            appointment(time(9, 0), time(9, 30), AppointmentStatus::Pending),
            appointment(time(9, 30), time(10, 0), AppointmentStatus::Completed),
            appointment(time(10, 0), time(10, 30), AppointmentStatus::Confirmed),
        ];

        let conflicts = find_conflicts(time(9, 15), time(10, 0), &existing);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[1].status, AppointmentStatus::Completed);
    }
}
