// libs/customer-cell/src/services/store.rs
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::SchedulingError;

use crate::models::{Customer, NewCustomer};

/// Persistence contract for customers. Phones passed in are already normalized.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, SchedulingError>;

    /// Atomic conditional create keyed on phone. Returns whichever record
    /// exists for the phone once the call completes.
    async fn create_if_absent(&self, customer: NewCustomer) -> Result<Customer, SchedulingError>;

    async fn get(&self, id: Uuid) -> Result<Customer, SchedulingError>;

    async fn increment_total_appointments(&self, id: Uuid) -> Result<(), SchedulingError>;
}

// ==============================================================================
// IN-MEMORY STORE
// ==============================================================================

#[derive(Default)]
struct CustomerIndex {
    by_id: HashMap<Uuid, Customer>,
    by_phone: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct InMemoryCustomerStore {
    index: RwLock<CustomerIndex>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, SchedulingError> {
        let index = self.index.read().await;
        Ok(index.by_phone.get(phone).and_then(|id| index.by_id.get(id)).cloned())
    }

    async fn create_if_absent(&self, customer: NewCustomer) -> Result<Customer, SchedulingError> {
        // Lookup and insert under one write guard.
        let mut index = self.index.write().await;

        if let Some(existing) = index.by_phone.get(&customer.phone).and_then(|id| index.by_id.get(id)) {
            debug!("Customer for phone already exists: {}", existing.id);
            return Ok(existing.clone());
        }

        let created = customer.into_customer(Uuid::new_v4(), Utc::now());
        index.by_phone.insert(created.phone.clone(), created.id);
        index.by_id.insert(created.id, created.clone());

        info!("Created customer {}", created.id);
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Customer, SchedulingError> {
        self.index
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| SchedulingError::not_found(format!("Customer {}", id)))
    }

    async fn increment_total_appointments(&self, id: Uuid) -> Result<(), SchedulingError> {
        let mut index = self.index.write().await;
        let customer = index
            .by_id
            .get_mut(&id)
            .ok_or_else(|| SchedulingError::not_found(format!("Customer {}", id)))?;

        customer.total_appointments += 1;
        debug!("Customer {} now has {} appointments", id, customer.total_appointments);
        Ok(())
    }
}

// ==============================================================================
// POSTGREST STORE
// ==============================================================================

/// Customers in the `customers` table. Relies on a unique index on `phone`.
pub struct SupabaseCustomerStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseCustomerStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(SupabaseClient::new(config)))
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl CustomerStore for SupabaseCustomerStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, SchedulingError> {
        let path = format!("/rest/v1/customers?phone=eq.{}", phone);
        let rows: Vec<Customer> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn create_if_absent(&self, customer: NewCustomer) -> Result<Customer, SchedulingError> {
        let phone = customer.phone.clone();
        let candidate = customer.into_customer(Uuid::new_v4(), Utc::now());

        // A row that loses the race on `phone` is skipped and not echoed back.
        let inserted: Vec<Customer> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/customers?on_conflict=phone",
            None,
            Some(json!(candidate)),
            Some(SupabaseClient::prefer_ignore_duplicates()),
        ).await?;

        if let Some(created) = inserted.into_iter().next() {
            info!("Created customer {}", created.id);
            return Ok(created);
        }

        debug!("Customer insert skipped as duplicate, reading the existing row");
        self.find_by_phone(&phone).await?.ok_or_else(|| {
            error!("Customer insert was skipped but no row exists for the phone");
            SchedulingError::OperationFailed("Customer vanished after conditional create".to_string())
        })
    }

    async fn get(&self, id: Uuid) -> Result<Customer, SchedulingError> {
        let path = format!("/rest/v1/customers?id=eq.{}", id);
        let rows: Vec<Customer> = self.supabase.request(Method::GET, &path, None, None).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SchedulingError::not_found(format!("Customer {}", id)))
    }

    async fn increment_total_appointments(&self, id: Uuid) -> Result<(), SchedulingError> {
        let _: Value = self.supabase.request(
            Method::POST,
            "/rest/v1/rpc/increment_customer_appointments",
            None,
            Some(json!({ "customer_id": id })),
        ).await?;

        debug!("Incremented appointment counter for customer {}", id);
        Ok(())
    }
}
