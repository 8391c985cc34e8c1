//! Identity provider token validation against a mocked JWKS endpoint.

mod common;

use axum::http::{HeaderValue, StatusCode};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{auth_name, bearer, test_config, TestHarness};
use hashdash_core::AccountId;
use hashdash_service::ServiceConfig;

const SIGNING_KEY: &[u8] = include_bytes!("fixtures/jwt_rsa.pem");
const JWKS: &str = include_str!("fixtures/jwks.json");

async fn identity_provider() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(JWKS))
        .mount(&server)
        .await;
    server
}

fn harness_for(idp: &MockServer) -> TestHarness {
    TestHarness::with_config(ServiceConfig {
        auth_base_url: idp.uri(),
        allow_test_tokens: false,
        ..test_config()
    })
}

fn sign(claims: &Value) -> HeaderValue {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("test-key".into());
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY).unwrap();
    let token = encode(&header, claims, &key).unwrap();
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

fn claims(idp: &MockServer, sub: &AccountId, extra: &Value) -> Value {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "sub": sub.to_string(),
        "aud": "hashdash",
        "iss": idp.uri(),
        "iat": now,
        "exp": now + 3600,
    });
    if let (Some(base), Some(extra)) = (claims.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    claims
}

#[tokio::test]
async fn valid_token_registers_with_email_claim() {
    let idp = identity_provider().await;
    let harness = harness_for(&idp);
    let user = AccountId::generate();

    let token = sign(&claims(
        &idp,
        &user,
        &json!({ "email": "jwt@example.com", "name": "Jwt Miner" }),
    ));

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header(auth_name(), token.clone())
        .json(&json!({}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["profile"]["account_id"], user.to_string());
    assert_eq!(body["profile"]["email"], "jwt@example.com");
    assert_eq!(body["profile"]["name"], "Jwt Miner");

    // Second request is served from the cached key set.
    harness
        .server
        .get("/v1/accounts/me")
        .add_header(auth_name(), token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn admin_role_claim_unlocks_admin_endpoints() {
    let idp = identity_provider().await;
    let harness = harness_for(&idp);

    let admin = sign(&claims(&idp, &AccountId::generate(), &json!({ "role": "admin" })));
    let user = sign(&claims(&idp, &AccountId::generate(), &json!({ "role": "user" })));

    harness
        .server
        .get("/v1/admin/overview")
        .add_header(auth_name(), admin)
        .await
        .assert_status_ok();

    harness
        .server
        .get("/v1/admin/overview")
        .add_header(auth_name(), user)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_audience_is_rejected() {
    let idp = identity_provider().await;
    let harness = harness_for(&idp);

    let token = sign(&claims(
        &idp,
        &AccountId::generate(),
        &json!({ "aud": "someone-else" }),
    ));

    harness
        .server
        .get("/v1/stats/me")
        .add_header(auth_name(), token)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let idp = identity_provider().await;
    let harness = harness_for(&idp);

    let long_ago = chrono::Utc::now().timestamp() - 7200;
    let token = sign(&claims(
        &idp,
        &AccountId::generate(),
        &json!({ "iat": long_ago, "exp": long_ago + 60 }),
    ));

    harness
        .server
        .get("/v1/stats/me")
        .add_header(auth_name(), token)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_tokens_are_refused_unless_enabled() {
    let idp = identity_provider().await;
    let harness = harness_for(&idp);

    harness
        .server
        .get("/v1/stats/me")
        .add_header(auth_name(), bearer(&AccountId::generate()))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn unreachable_key_set_is_a_gateway_error() {
    let idp = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&idp)
        .await;
    let harness = harness_for(&idp);

    let token = sign(&claims(&idp, &AccountId::generate(), &json!({})));

    harness
        .server
        .get("/v1/stats/me")
        .add_header(auth_name(), token)
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}
