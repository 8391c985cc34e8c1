//! Account, stats, notification and mining integration tests.

mod common;

use axum::http::StatusCode;
use common::{api_key, api_key_name, auth_name, bearer, TestHarness, SERVICE_API_KEY};
use hashdash_core::{AccountId, Notification};
use hashdash_store::Store;
use serde_json::{json, Value};

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_success() {
    let harness = TestHarness::new();

    let body = harness.register(harness.test_user_id, None).await;

    assert_eq!(body["profile"]["account_id"], harness.test_user_id.to_string());
    assert_eq!(body["stats"]["level"], 1);
    assert_eq!(body["stats"]["total_points"], 0);
    assert_eq!(body["referral_attributed"], false);
}

#[tokio::test]
async fn register_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/accounts")
        .json(&json!({ "email": "a@example.com" }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn register_duplicate_conflicts() {
    let harness = TestHarness::new();
    harness.register(harness.test_user_id, None).await;

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .json(&json!({ "email": "again@example.com" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn register_requires_email() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .json(&json!({}))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn get_nonexistent_profile_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/accounts/me")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn update_profile() {
    let harness = TestHarness::new();
    harness.register(harness.test_user_id, None).await;

    let response = harness
        .server
        .patch("/v1/accounts/me")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .json(&json!({ "country": "PT", "telegram": "@miner" }))
        .await;
    response.assert_status_ok();

    let body: Value = harness
        .server
        .get("/v1/accounts/me")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .await
        .json();
    assert_eq!(body["country"], "PT");
    assert_eq!(body["telegram"], "@miner");
    assert_eq!(body["name"], "Test Miner");
}

#[tokio::test]
async fn update_profile_rejects_blank_email() {
    let harness = TestHarness::new();
    harness.register(harness.test_user_id, None).await;

    let response = harness
        .server
        .patch("/v1/accounts/me")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .json(&json!({ "email": "" }))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Mining
// ============================================================================

#[tokio::test]
async fn mining_accrual_updates_stats() {
    let harness = TestHarness::new();
    harness.register(harness.test_user_id, None).await;

    let response = harness
        .server
        .post("/v1/mining/accrue")
        .add_header(api_key_name(), api_key(SERVICE_API_KEY))
        .json(&json!({
            "account_id": harness.test_user_id.to_string(),
            "amount_cents": 1250,
            "points": 12,
        }))
        .await;
    response.assert_status_ok();

    let stats: Value = harness
        .server
        .get("/v1/stats/me")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .await
        .json();
    assert_eq!(stats["mining_balance_cents"], 1250);
    assert_eq!(stats["mining_balance_formatted"], "$12.50");
    assert_eq!(stats["earnings_cents"], 1250);
    assert_eq!(stats["total_points"], 12);
}

#[tokio::test]
async fn mining_accrual_requires_api_key() {
    let harness = TestHarness::new();

    let body = json!({
        "account_id": harness.test_user_id.to_string(),
        "amount_cents": 100,
    });

    harness
        .server
        .post("/v1/mining/accrue")
        .json(&body)
        .await
        .assert_status_unauthorized();

    harness
        .server
        .post("/v1/mining/accrue")
        .add_header(api_key_name(), api_key("wrong-key"))
        .json(&body)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn mining_accrual_rejects_negative_amounts() {
    let harness = TestHarness::new();
    harness.register(harness.test_user_id, None).await;

    harness
        .server
        .post("/v1/mining/accrue")
        .add_header(api_key_name(), api_key(SERVICE_API_KEY))
        .json(&json!({
            "account_id": harness.test_user_id.to_string(),
            "amount_cents": -100,
        }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn mining_accrual_unknown_account() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/mining/accrue")
        .add_header(api_key_name(), api_key(SERVICE_API_KEY))
        .json(&json!({
            "account_id": AccountId::generate().to_string(),
            "amount_cents": 100,
        }))
        .await
        .assert_status_not_found();
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn notifications_list_and_mark_read() {
    let harness = TestHarness::new();
    harness.register(harness.test_user_id, None).await;

    let notification = Notification::referral_reward(harness.test_user_id);
    harness.store.insert_notification(&notification).unwrap();

    let body: Value = harness
        .server
        .get("/v1/notifications")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .await
        .json();
    assert_eq!(body["unread"], 1);
    assert_eq!(body["notifications"][0]["kind"], "success");
    assert_eq!(body["notifications"][0]["title"], "New Referral!");

    let response = harness
        .server
        .post(&format!("/v1/notifications/{}/read", notification.id))
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .await;
    response.assert_status_ok();
    let marked: Value = response.json();
    assert_eq!(marked["read"], true);

    let body: Value = harness
        .server
        .get("/v1/notifications")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .await
        .json();
    assert_eq!(body["unread"], 0);
}

#[tokio::test]
async fn cannot_mark_another_users_notification() {
    let harness = TestHarness::new();
    let owner = AccountId::generate();
    let notification = Notification::referral_reward(owner);
    harness.store.insert_notification(&notification).unwrap();

    harness
        .server
        .post(&format!("/v1/notifications/{}/read", notification.id))
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn mark_read_rejects_malformed_id() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/notifications/not-an-id/read")
        .add_header(auth_name(), bearer(&harness.test_user_id))
        .await
        .assert_status_bad_request();
}
