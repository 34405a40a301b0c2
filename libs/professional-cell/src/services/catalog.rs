// libs/professional-cell/src/services/catalog.rs
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::SchedulingError;

use crate::models::{CatalogSnapshot, Professional, Service};

/// Read side of the service catalog and professionals' work hours.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_professional(&self, id: Uuid) -> Result<Professional, SchedulingError>;

    async fn list_professionals(&self) -> Result<Vec<Professional>, SchedulingError>;

    async fn get_service(&self, id: Uuid) -> Result<Service, SchedulingError>;

    async fn list_services(&self) -> Result<Vec<Service>, SchedulingError>;

    /// Services in the order requested. Fails on the first unknown id.
    async fn get_services(&self, ids: &[Uuid]) -> Result<Vec<Service>, SchedulingError> {
        let mut services = Vec::with_capacity(ids.len());
        for id in ids {
            services.push(self.get_service(*id).await?);
        }
        Ok(services)
    }
}

// ==============================================================================
// IN-MEMORY CATALOG
// ==============================================================================

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    professionals: RwLock<HashMap<Uuid, Professional>>,
    services: RwLock<HashMap<Uuid, Service>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, SchedulingError> {
        let mut services = HashMap::with_capacity(snapshot.services.len());
        for service in snapshot.services {
            service.validate()?;
            services.insert(service.id, service);
        }

        let mut professionals = HashMap::with_capacity(snapshot.professionals.len());
        for professional in snapshot.professionals {
            if let Some(unknown) = professional.service_ids.iter().find(|id| !services.contains_key(id)) {
                return Err(SchedulingError::validation(format!(
                    "Professional {} offers unknown service {}", professional.id, unknown
                )));
            }
            professionals.insert(professional.id, professional);
        }

        info!("Loaded catalog with {} services and {} professionals",
              services.len(), professionals.len());

        Ok(Self {
            professionals: RwLock::new(professionals),
            services: RwLock::new(services),
        })
    }

    /// Loads a JSON `CatalogSnapshot` from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchedulingError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SchedulingError::OperationFailed(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&raw).map_err(|e| {
            SchedulingError::validation(format!("Invalid catalog {}: {}", path.display(), e))
        })?;
        Self::from_snapshot(snapshot)
    }

    pub async fn upsert_service(&self, service: Service) -> Result<(), SchedulingError> {
        service.validate()?;
        debug!("Upserting service {} ({})", service.id, service.name);
        self.services.write().await.insert(service.id, service);
        Ok(())
    }

    pub async fn upsert_professional(&self, professional: Professional) -> Result<(), SchedulingError> {
        let services = self.services.read().await;
        if let Some(unknown) = professional.service_ids.iter().find(|id| !services.contains_key(id)) {
            return Err(SchedulingError::validation(format!(
                "Professional {} offers unknown service {}", professional.id, unknown
            )));
        }
        drop(services);

        debug!("Upserting professional {} ({})", professional.id, professional.name);
        self.professionals.write().await.insert(professional.id, professional);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_professional(&self, id: Uuid) -> Result<Professional, SchedulingError> {
        self.professionals
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| SchedulingError::not_found(format!("Professional {}", id)))
    }

    async fn list_professionals(&self) -> Result<Vec<Professional>, SchedulingError> {
        let mut professionals: Vec<Professional> =
            self.professionals.read().await.values().cloned().collect();
        professionals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(professionals)
    }

    async fn get_service(&self, id: Uuid) -> Result<Service, SchedulingError> {
        self.services
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| SchedulingError::not_found(format!("Service {}", id)))
    }

    async fn list_services(&self) -> Result<Vec<Service>, SchedulingError> {
        let mut services: Vec<Service> = self.services.read().await.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }
}

// ==============================================================================
// POSTGREST CATALOG
// ==============================================================================

/// Catalog read from the `professionals` and `services` tables.
pub struct SupabaseCatalog {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseCatalog {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(SupabaseClient::new(config)))
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl CatalogStore for SupabaseCatalog {
    async fn get_professional(&self, id: Uuid) -> Result<Professional, SchedulingError> {
        let path = format!("/rest/v1/professionals?id=eq.{}", id);
        let rows: Vec<Professional> = self.supabase.request(Method::GET, &path, None, None).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SchedulingError::not_found(format!("Professional {}", id)))
    }

    async fn list_professionals(&self) -> Result<Vec<Professional>, SchedulingError> {
        let rows: Vec<Professional> = self.supabase
            .request(Method::GET, "/rest/v1/professionals?order=name.asc", None, None)
            .await?;
        Ok(rows)
    }

    async fn get_service(&self, id: Uuid) -> Result<Service, SchedulingError> {
        let path = format!("/rest/v1/services?id=eq.{}", id);
        let rows: Vec<Service> = self.supabase.request(Method::GET, &path, None, None).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SchedulingError::not_found(format!("Service {}", id)))
    }

    async fn list_services(&self) -> Result<Vec<Service>, SchedulingError> {
        let rows: Vec<Service> = self.supabase
            .request(Method::GET, "/rest/v1/services?order=name.asc", None, None)
            .await?;
        Ok(rows)
    }

    async fn get_services(&self, ids: &[Uuid]) -> Result<Vec<Service>, SchedulingError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",");
        let path = format!("/rest/v1/services?id=in.({})", id_list);
        let rows: Vec<Service> = self.supabase.request(Method::GET, &path, None, None).await?;

        let by_id: HashMap<Uuid, Service> = rows.into_iter().map(|s| (s.id, s)).collect();
        ids.iter()
            .map(|id| {
                by_id.get(id)
                    .cloned()
                    .ok_or_else(|| SchedulingError::not_found(format!("Service {}", id)))
            })
            .collect()
    }
}
