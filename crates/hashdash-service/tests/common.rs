//! Common test utilities for hashdash integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};

use hashdash_core::{AccountId, ReferralCode, ReferralRecord};
use hashdash_service::{create_router, AppState, ServiceConfig};
use hashdash_store::{MemoryStore, Store};

pub const SERVICE_API_KEY: &str = "test-service-key";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct access to the backing store.
    pub store: Arc<MemoryStore>,
    /// A test user for authenticated requests.
    pub test_user_id: AccountId,
}

impl TestHarness {
    /// Create a harness over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        let server = TestServer::new(create_router(state)).expect("Failed to create test server");

        Self {
            server,
            store,
            test_user_id: AccountId::generate(),
        }
    }

    /// Register `account_id` through the API.
    pub async fn register(&self, account_id: AccountId, referral_code: Option<&str>) -> Value {
        let response = self
            .server
            .post("/v1/accounts")
            .add_header(auth_name(), bearer(&account_id))
            .json(&json!({
                "email": format!("{}@example.com", account_id.fragment()),
                "name": "Test Miner",
                "referral_code": referral_code,
            }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Seed a prior referral so that `code` resolves to `referrer`.
    pub fn seed_referral_code(&self, referrer: AccountId) -> ReferralCode {
        let code = ReferralCode::generate(&referrer);
        self.store
            .insert_referral(&ReferralRecord::new(referrer, AccountId::generate(), code.clone()))
            .expect("Failed to seed referral");
        code
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        auth_base_url: "http://localhost".into(),
        service_api_key: Some(SERVICE_API_KEY.into()),
        public_base_url: "https://dash.example".into(),
        allow_test_tokens: true,
        ..ServiceConfig::default()
    }
}

pub fn auth_name() -> HeaderName {
    HeaderName::from_static("authorization")
}

pub fn bearer(account_id: &AccountId) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer test-token:{account_id}")).expect("valid header")
}

pub fn admin_bearer(account_id: &AccountId) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer test-token:{account_id}:admin")).expect("valid header")
}

pub fn api_key_name() -> HeaderName {
    HeaderName::from_static("x-api-key")
}

pub fn api_key(key: &str) -> HeaderValue {
    HeaderValue::from_str(key).expect("valid header")
}
