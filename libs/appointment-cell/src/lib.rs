pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::AppointmentState;
pub use models::{Appointment, AppointmentStatus, NewAppointment};
pub use router::appointment_routes;
