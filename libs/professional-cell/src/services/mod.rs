pub mod catalog;
pub mod slots;

pub use catalog::{CatalogStore, InMemoryCatalog, SupabaseCatalog};
pub use slots::{generate_slots, SlotGenerator, SlotSteps};
