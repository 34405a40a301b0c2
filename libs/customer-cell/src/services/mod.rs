pub mod resolver;
pub mod store;

pub use resolver::CustomerResolver;
pub use store::{CustomerStore, InMemoryCustomerStore, SupabaseCustomerStore};
