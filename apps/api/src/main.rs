use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::{
    AppointmentLifecycle, AppointmentStore, AvailabilityService, BookingSessions,
    InMemoryAppointmentStore, SupabaseAppointmentStore,
};
use appointment_cell::AppointmentState;
use customer_cell::services::{
    CustomerResolver, CustomerStore, InMemoryCustomerStore, SupabaseCustomerStore,
};
use professional_cell::services::{CatalogStore, InMemoryCatalog, SupabaseCatalog};
use shared_config::{AppConfig, StorageBackend};
use shared_database::SupabaseClient;
use shared_utils::{Clock, SystemClock};

struct Stores {
    catalog: Arc<dyn CatalogStore>,
    customers: Arc<dyn CustomerStore>,
    appointments: Arc<dyn AppointmentStore>,
}

fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    match config.storage_backend {
        StorageBackend::Memory => {
            let catalog = match &config.catalog_path {
                Some(path) => InMemoryCatalog::from_json_file(path)
                    .with_context(|| format!("loading catalog from {}", path))?,
                None => InMemoryCatalog::new(),
            };
            info!("Using in-memory storage");

            Ok(Stores {
                catalog: Arc::new(catalog),
                customers: Arc::new(InMemoryCustomerStore::new()),
                appointments: Arc::new(InMemoryAppointmentStore::new()),
            })
        }
        StorageBackend::Supabase => {
            if !config.is_configured() {
                anyhow::bail!("STORAGE_BACKEND=supabase requires SUPABASE_URL, SUPABASE_ANON_PUBLIC_KEY and SUPABASE_JWT_SECRET");
            }
            let supabase = Arc::new(SupabaseClient::new(config));
            info!("Using Supabase storage at {}", supabase.get_base_url());

            Ok(Stores {
                catalog: Arc::new(SupabaseCatalog::with_client(supabase.clone())),
                customers: Arc::new(SupabaseCustomerStore::with_client(supabase.clone())),
                appointments: Arc::new(SupabaseAppointmentStore::with_client(supabase)),
            })
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Booking API server");

    let config = Arc::new(AppConfig::from_env());

    let stores = build_stores(&config)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::in_offset(config.utc_offset));

    let state = AppointmentState {
        lifecycle: Arc::new(AppointmentLifecycle::new(
            stores.appointments.clone(),
            stores.customers.clone(),
            stores.catalog.clone(),
            clock.clone(),
        )),
        availability: Arc::new(AvailabilityService::new(
            stores.catalog.clone(),
            stores.appointments.clone(),
            clock.clone(),
        )),
        customers: Arc::new(CustomerResolver::new(stores.customers.clone())),
        catalog: stores.catalog.clone(),
        sessions: Arc::new(BookingSessions::new(
            config.booking_session_ttl(),
            clock,
        )),
    };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(config.clone(), state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
