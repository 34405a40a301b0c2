// libs/customer-cell/src/services/resolver.rs
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_models::error::SchedulingError;

use crate::models::{normalize_phone, Customer, NewCustomer};
use crate::services::store::CustomerStore;

/// Find-or-create for customer identities keyed by phone.
pub struct CustomerResolver {
    store: Arc<dyn CustomerStore>,
}

impl CustomerResolver {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    /// Returns the customer for `phone`, creating it when absent. An existing
    /// customer comes back unmodified; `name` and `email` only apply on creation.
    pub async fn resolve(
        &self,
        phone: &str,
        name: &str,
        email: Option<&str>,
    ) -> Result<Customer, SchedulingError> {
        let phone = normalize_phone(phone)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SchedulingError::validation("Customer name must not be empty"));
        }

        if let Some(existing) = self.store.find_by_phone(&phone).await? {
            debug!("Resolved existing customer {}", existing.id);
            return Ok(existing);
        }

        let email = email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_string);
        self.store
            .create_if_absent(NewCustomer { name: name.to_string(), phone, email })
            .await
    }

    pub async fn get(&self, customer_id: Uuid) -> Result<Customer, SchedulingError> {
        self.store.get(customer_id).await
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, SchedulingError> {
        let phone = normalize_phone(phone)?;
        self.store.find_by_phone(&phone).await
    }

    pub fn store(&self) -> Arc<dyn CustomerStore> {
        Arc::clone(&self.store)
    }
}
