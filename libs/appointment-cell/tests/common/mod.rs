// Shared fixture: one professional working Mon-Fri 09:00-19:00, in-memory stores,
// and a clock pinned to Monday 2026-10-19.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
use uuid::Uuid;

use appointment_cell::handlers::AppointmentState;
use appointment_cell::models::{Appointment, NewAppointment};
use appointment_cell::services::{
    AppointmentLifecycle, AvailabilityService, BookingSessions, InMemoryAppointmentStore,
};
use customer_cell::services::{CustomerResolver, InMemoryCustomerStore};
use customer_cell::Customer;
use professional_cell::models::{CatalogSnapshot, Professional, Service, WorkHours, WorkWeek};
use professional_cell::services::InMemoryCatalog;
use shared_utils::clock::FixedClock;

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn service(name: &str, price: f64, duration_minutes: u32, is_active: bool) -> Service {
    Service {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
        duration_minutes,
        is_active,
    }
}

pub struct Fixture {
    pub catalog: Arc<InMemoryCatalog>,
    pub appointments: Arc<InMemoryAppointmentStore>,
    pub customers: Arc<InMemoryCustomerStore>,
    pub resolver: Arc<CustomerResolver>,
    pub lifecycle: Arc<AppointmentLifecycle>,
    pub availability: Arc<AvailabilityService>,
    pub clock: Arc<FixedClock>,
    pub professional: Professional,
    /// 30 minutes, 30.00
    pub haircut: Service,
    /// 15 minutes, 12.50
    pub beard: Service,
    /// Offered but inactive.
    pub perm: Service,
    /// Active but not offered by the professional.
    pub massage: Service,
}

impl Fixture {
    pub fn new() -> Self {
        let haircut = service("Haircut", 30.0, 30, true);
        let beard = service("Beard trim", 12.5, 15, true);
        let perm = service("Perm", 80.0, 120, false);
        let massage = service("Massage", 50.0, 60, true);

        let professional = Professional {
            id: Uuid::new_v4(),
            name: "Alex Moreno".to_string(),
            service_ids: vec![haircut.id, beard.id, perm.id],
            work_hours: WorkWeek::uniform(
                &[Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
                WorkHours::open(time(9, 0), time(19, 0)),
            ),
        };

        let catalog = Arc::new(
            InMemoryCatalog::from_snapshot(CatalogSnapshot {
                services: vec![haircut.clone(), beard.clone(), perm.clone(), massage.clone()],
                professionals: vec![professional.clone()],
            })
            .unwrap(),
        );
        let appointments = Arc::new(InMemoryAppointmentStore::new());
        let customers = Arc::new(InMemoryCustomerStore::new());
        let clock = Arc::new(FixedClock::on(monday()));

        let resolver = Arc::new(CustomerResolver::new(customers.clone()));
        let lifecycle = Arc::new(AppointmentLifecycle::new(
            appointments.clone(),
            customers.clone(),
            catalog.clone(),
            clock.clone(),
        ));
        let availability = Arc::new(AvailabilityService::new(
            catalog.clone(),
            appointments.clone(),
            clock.clone(),
        ));

        Self {
            catalog,
            appointments,
            customers,
            resolver,
            lifecycle,
            availability,
            clock,
            professional,
            haircut,
            beard,
            perm,
            massage,
        }
    }

    pub async fn customer(&self, phone: &str) -> Customer {
        self.resolver.resolve(phone, "Dana Ortiz", None).await.unwrap()
    }

    pub fn request(&self, customer_id: Uuid, services: &[&Service], start: NaiveTime) -> NewAppointment {
        NewAppointment {
            customer_id,
            professional_id: self.professional.id,
            service_ids: services.iter().map(|s| s.id).collect(),
            date: monday(),
            start_time: start,
            notes: None,
        }
    }

    pub async fn book_haircut(&self, start: NaiveTime) -> Appointment {
        let customer = self.customer("555 010 2030").await;
        self.lifecycle
            .create(self.request(customer.id, &[&self.haircut], start))
            .await
            .unwrap()
    }

    pub fn state(&self) -> AppointmentState {
        AppointmentState {
            lifecycle: self.lifecycle.clone(),
            availability: self.availability.clone(),
            customers: self.resolver.clone(),
            catalog: self.catalog.clone(),
            sessions: Arc::new(BookingSessions::new(Duration::minutes(30), self.clock.clone())),
        }
    }
}
