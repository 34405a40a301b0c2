pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{normalize_phone, Customer, NewCustomer};
pub use router::customer_routes;
pub use services::{CustomerResolver, CustomerStore};
