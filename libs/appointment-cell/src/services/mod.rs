pub mod availability;
pub mod conflict;
pub mod consistency;
pub mod lifecycle;
pub mod sessions;
pub mod store;
pub mod supabase_store;
pub mod workflow;

pub use availability::AvailabilityService;
pub use conflict::{appointments_overlap, find_conflicts, mark_availability};
pub use consistency::SlotLocks;
pub use lifecycle::AppointmentLifecycle;
pub use sessions::{BookingSessions, SharedWorkflow};
pub use store::{AppointmentStore, InMemoryAppointmentStore};
pub use supabase_store::SupabaseAppointmentStore;
pub use workflow::{BookingDraft, BookingStep, BookingWorkflow};
