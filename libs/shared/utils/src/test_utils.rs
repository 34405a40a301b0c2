use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, FixedOffset, Offset, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::{AppConfig, StorageBackend};
use shared_models::auth::{User, ROLE_ADMIN, ROLE_CUSTOMER, ROLE_PROFESSIONAL};

const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

/// Settings a test server is built from. Storage is always in-memory here;
/// PostgREST tests point `supabase_url` at a mock server instead.
pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub booking_session_ttl_minutes: i64,
    pub utc_offset: FixedOffset,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            booking_session_ttl_minutes: 30,
            utc_offset: Utc.fix(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            storage_backend: StorageBackend::Memory,
            catalog_path: None,
            bind_address: "127.0.0.1:0".to_string(),
            booking_session_ttl_minutes: self.booking_session_ttl_minutes,
            utc_offset: self.utc_offset,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Identity carried in a signed test token.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::customer()
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn customer() -> Self {
        Self::new("customer@example.com", ROLE_CUSTOMER)
    }

    pub fn admin() -> Self {
        Self::new("front-desk@example.com", ROLE_ADMIN)
    }

    /// A professional that owns no calendar in the test catalog.
    pub fn professional() -> Self {
        Self::new("stylist@example.com", ROLE_PROFESSIONAL)
    }

    /// The professional whose calendar is `id`.
    pub fn professional_with_id(id: Uuid) -> Self {
        Self {
            id: id.to_string(),
            ..Self::professional()
        }
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }

    fn claims(&self, expires_in: Duration) -> Value {
        let issued = Utc::now();
        json!({
            "sub": self.id,
            "email": self.email,
            "role": self.role,
            "iat": issued.timestamp(),
            "exp": (issued + expires_in).timestamp()
        })
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// HS256 token over `claims`, encoded the way Supabase issues them.
    fn sign(claims: &Value, secret: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header, payload);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(signing_input.as_bytes());

        format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let lifetime = Duration::hours(exp_hours.unwrap_or(24));
        Self::sign(&user.claims(lifetime), secret)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::sign(&user.claims(Duration::hours(-1)), secret)
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "not-the-configured-secret", None)
    }

    pub fn create_malformed_token() -> String {
        "not.a-valid.jwt".to_string()
    }

    /// `Authorization` header value under the default test secret.
    pub fn bearer_for(user: &TestUser) -> String {
        format!("Bearer {}", Self::create_test_token(user, TEST_JWT_SECRET, None))
    }
}
