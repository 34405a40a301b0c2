// libs/customer-cell/tests/resolver_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use customer_cell::customer_routes;
use customer_cell::services::{CustomerResolver, CustomerStore, InMemoryCustomerStore, SupabaseCustomerStore};
use shared_models::error::SchedulingError;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn in_memory() -> (Arc<InMemoryCustomerStore>, CustomerResolver) {
    let store = Arc::new(InMemoryCustomerStore::new());
    let resolver = CustomerResolver::new(store.clone());
    (store, resolver)
}

#[tokio::test]
async fn resolve_creates_then_returns_the_same_customer() {
    let (store, resolver) = in_memory();

    let first = resolver.resolve("555-010-2030", "Dana Ortiz", Some("dana@example.com")).await.unwrap();
    assert_eq!(first.phone, "5550102030");
    assert_eq!(first.total_appointments, 0);
    assert_eq!(first.email.as_deref(), Some("dana@example.com"));

    let second = resolver.resolve("(555) 010 2030", "Someone Else", None).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, "Dana Ortiz");
    assert_eq!(second.email.as_deref(), Some("dana@example.com"));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn concurrent_resolves_for_one_phone_create_one_record() {
    let (store, resolver) = in_memory();
    let resolver = Arc::new(resolver);

    let attempts = (0..16).map(|i| {
        let resolver = resolver.clone();
        let phone = if i % 2 == 0 { "+1 555 010 9999" } else { "15550109999" };
        async move { resolver.resolve(phone, &format!("Walk-in {}", i), None).await }
    });
    let results = join_all(attempts).await;

    let ids: Vec<Uuid> = results.into_iter().map(|r| r.unwrap().id).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn concurrent_creates_race_on_the_store_directly() {
    let store = Arc::new(InMemoryCustomerStore::new());

    let attempts = (0..8).map(|i| {
        let store = store.clone();
        tokio::spawn(async move {
            store.create_if_absent(customer_cell::NewCustomer {
                name: format!("Racer {}", i),
                phone: "5550100000".to_string(),
                email: None,
            }).await
        })
    });

    let results = join_all(attempts).await;
    let ids: Vec<Uuid> = results.into_iter().map(|r| r.unwrap().unwrap().id).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn rejects_blank_names_and_digitless_phones() {
    let (store, resolver) = in_memory();

    assert_matches!(
        resolver.resolve("5550102030", "   ", None).await,
        Err(SchedulingError::ValidationError(_))
    );
    assert_matches!(
        resolver.resolve("no digits", "Dana", None).await,
        Err(SchedulingError::ValidationError(_))
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn counter_increments_and_unknown_ids_are_not_found() {
    let (store, resolver) = in_memory();
    let customer = resolver.resolve("5550102030", "Dana", None).await.unwrap();

    store.increment_total_appointments(customer.id).await.unwrap();
    store.increment_total_appointments(customer.id).await.unwrap();
    assert_eq!(resolver.get(customer.id).await.unwrap().total_appointments, 2);

    assert_matches!(resolver.get(Uuid::new_v4()).await, Err(SchedulingError::NotFound(_)));
    assert_matches!(
        store.increment_total_appointments(Uuid::new_v4()).await,
        Err(SchedulingError::NotFound(_))
    );
}

#[tokio::test]
async fn find_by_phone_normalizes_input() {
    let (_, resolver) = in_memory();
    let created = resolver.resolve("555 010 2030", "Dana", None).await.unwrap();

    let found = resolver.find_by_phone("555.010.2030").await.unwrap();
    assert_eq!(found.map(|c| c.id), Some(created.id));
    assert!(resolver.find_by_phone("5550000000").await.unwrap().is_none());
}

// ==============================================================================
// POSTGREST STORE
// ==============================================================================

fn customer_row(id: Uuid, name: &str, phone: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "phone": phone,
        "email": null,
        "total_appointments": 3,
        "created_at": Utc::now().to_rfc3339()
    })
}

#[tokio::test]
async fn supabase_create_returns_inserted_row() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .and(query_param("on_conflict", "phone"))
        .and(body_partial_json(json!({"phone": "5550102030", "total_appointments": 0})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([customer_row(id, "Dana", "5550102030")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseCustomerStore::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());
    let created = store.create_if_absent(customer_cell::NewCustomer {
        name: "Dana".to_string(),
        phone: "5550102030".to_string(),
        email: None,
    }).await.unwrap();

    assert_eq!(created.id, id);
}

#[tokio::test]
async fn supabase_duplicate_insert_reads_back_the_winner() {
    let mock_server = MockServer::start().await;
    let winner = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/customers"))
        .and(query_param("phone", "eq.5550102030"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([customer_row(winner, "First Writer", "5550102030")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseCustomerStore::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());
    let resolved = store.create_if_absent(customer_cell::NewCustomer {
        name: "Second Writer".to_string(),
        phone: "5550102030".to_string(),
        email: None,
    }).await.unwrap();

    assert_eq!(resolved.id, winner);
    assert_eq!(resolved.name, "First Writer");
}

#[tokio::test]
async fn supabase_increment_calls_the_rpc() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/increment_customer_appointments"))
        .and(body_partial_json(json!({"customer_id": id})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseCustomerStore::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());
    store.increment_total_appointments(id).await.unwrap();
}

#[tokio::test]
async fn supabase_transport_errors_are_operation_failed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/customers"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let store = SupabaseCustomerStore::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config());
    assert_matches!(store.get(Uuid::new_v4()).await, Err(SchedulingError::OperationFailed(_)));
}

// ==============================================================================
// ROUTER
// ==============================================================================

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn resolve_request(user: &TestUser, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/resolve")
        .header("Authorization", JwtTestUtils::bearer_for(user))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn staff_can_resolve_customers_over_http() {
    let (_, resolver) = in_memory();
    let app = customer_routes(TestConfig::default().to_arc(), Arc::new(resolver));

    let body = json!({"phone": "+1 555 010 2030", "name": "Dana"});
    let (status, created) = send(app.clone(), resolve_request(&TestUser::admin(), body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["phone"], "15550102030");

    let get = Request::builder()
        .uri(format!("/{}", created["id"].as_str().unwrap()))
        .header("Authorization", JwtTestUtils::bearer_for(&TestUser::professional()))
        .body(Body::empty())
        .unwrap();
    let (status, fetched) = send(app, get).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
}

#[tokio::test]
async fn customers_cannot_use_staff_routes() {
    let (_, resolver) = in_memory();
    let app = customer_routes(TestConfig::default().to_arc(), Arc::new(resolver));

    let body = json!({"phone": "5550102030", "name": "Dana"});
    let (status, _) = send(app, resolve_request(&TestUser::customer(), body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_phone_is_a_bad_request() {
    let (_, resolver) = in_memory();
    let app = customer_routes(TestConfig::default().to_arc(), Arc::new(resolver));

    let body = json!({"phone": "n/a", "name": "Dana"});
    let (status, error) = send(app, resolve_request(&TestUser::admin(), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("no digits"));
}
