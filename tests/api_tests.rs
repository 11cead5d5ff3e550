//! Endpoint-level tests for the account, session, and admin surfaces.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use frosthub::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Login seeded by the initial migration.
const BOOTSTRAP_LOGIN: &str = "admin";
const BOOTSTRAP_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("frosthub-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;

    let state = frosthub::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    frosthub::api::router(state).await
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).to_string())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Register an account and return its session cookie.
async fn register(app: &Router, login: &str, password: &str) -> (String, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &serde_json::json!({"login": login, "password": password, "confirm": password}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "register {login} failed");
    let cookie = session_cookie(&response).expect("missing session cookie");
    let body = body_json(response).await;
    (cookie, body["data"].clone())
}

/// Log in and return the session cookie.
async fn login(app: &Router, login: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &serde_json::json!({"login": login, "password": password}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login {login} failed");
    session_cookie(&response).expect("missing session cookie")
}

async fn roster_entry(app: &Router, target: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(get_request("/api/accounts", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["login"] == target)
        .cloned()
        .unwrap_or_else(|| panic!("{target} not in roster"))
}

#[tokio::test]
async fn test_register_login_logout_flow() {
    let app = spawn_app().await;

    let (cookie, account) = register(&app, "alice", "pass1").await;
    assert_eq!(account["login"], "alice");
    assert_eq!(account["coins"], 0);
    assert_eq!(account["is_admin"], false);
    assert!(account["prefix"].is_null());

    // Session resolves to the account
    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["account"]["login"], "alice");

    // Logout, then the same cookie resolves to Anonymous
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", &serde_json::json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["account"].is_null());

    // Logout is idempotent
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", &serde_json::json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_without_session_is_anonymous() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["account"].is_null());
}

#[tokio::test]
async fn test_duplicate_login_is_case_insensitive() {
    let app = spawn_app().await;

    register(&app, "foo", "secret1").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &serde_json::json!({"login": "Foo", "password": "other1", "confirm": "other1"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_registration_validation() {
    let app = spawn_app().await;

    // Credential shorter than 4
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &serde_json::json!({"login": "Bob", "password": "ab", "confirm": "ab"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Password must be at least 4"));

    // Login shorter than 3
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &serde_json::json!({"login": "bo", "password": "abcd", "confirm": "abcd"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Login must be at least 3"));

    // Confirmation mismatch
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &serde_json::json!({"login": "carol", "password": "abcd", "confirm": "abce"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("confirmation"));
}

#[tokio::test]
async fn test_login_rejections() {
    let app = spawn_app().await;

    // Unknown login
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &serde_json::json!({"login": "ghost", "password": "whatever"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong password, however close
    register(&app, "dave", "correct-horse").await;
    for wrong in ["correct-hors", "correct-horsE", "x"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                &serde_json::json!({"login": "dave", "password": wrong}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Wrong password"));
    }

    // Login lookup is case-insensitive
    let cookie = login(&app, "DAVE", "correct-horse").await;
    assert!(!cookie.is_empty());
}

#[tokio::test]
async fn test_admin_coin_and_prefix_scenario() {
    let app = spawn_app().await;

    register(&app, "alice", "pass1").await;
    let admin = login(&app, BOOTSTRAP_LOGIN, BOOTSTRAP_PASSWORD).await;

    // credit 500
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/credit",
            &serde_json::json!({"login": "alice", "amount": 500}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(roster_entry(&app, "alice").await["coins"], 500);

    // over-debit clamps at zero, never negative
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/debit",
            &serde_json::json!({"login": "alice", "amount": 700}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(roster_entry(&app, "alice").await["coins"], 0);

    // set then clear prefix
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/admin/prefix",
            &serde_json::json!({"login": "alice", "prefix": "vip"}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(roster_entry(&app, "alice").await["prefix"], "vip");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/admin/prefix",
            &serde_json::json!({"login": "alice", "prefix": null}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(roster_entry(&app, "alice").await["prefix"].is_null());
}

#[tokio::test]
async fn test_debit_sequence_never_goes_negative() {
    let app = spawn_app().await;

    register(&app, "erin", "pass1").await;
    let admin = login(&app, BOOTSTRAP_LOGIN, BOOTSTRAP_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/credit",
            &serde_json::json!({"login": "erin", "amount": 100}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for amount in [30, 30, 30, 30, 30] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/admin/coins/debit",
                &serde_json::json!({"login": "erin", "amount": amount}),
                Some(&admin),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let coins = roster_entry(&app, "erin").await["coins"].as_i64().unwrap();
        assert!(coins >= 0, "balance went negative: {coins}");
    }

    assert_eq!(roster_entry(&app, "erin").await["coins"], 0);
}

#[tokio::test]
async fn test_admin_grant_and_revoke() {
    let app = spawn_app().await;

    register(&app, "frank", "pass1").await;
    let admin = login(&app, BOOTSTRAP_LOGIN, BOOTSTRAP_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/admin/role",
            &serde_json::json!({"login": "frank", "is_admin": true}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(roster_entry(&app, "frank").await["is_admin"], true);

    // A freshly-granted admin can mutate others
    let frank = login(&app, "frank", "pass1").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/credit",
            &serde_json::json!({"login": "admin", "amount": 10}),
            Some(&frank),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/admin/role",
            &serde_json::json!({"login": "frank", "is_admin": false}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(roster_entry(&app, "frank").await["is_admin"], false);

    // Revocation is enforced on the live record, not the session
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/credit",
            &serde_json::json!({"login": "admin", "amount": 10}),
            Some(&frank),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_operations_require_privileges() {
    let app = spawn_app().await;

    let (alice, _) = register(&app, "alice", "pass1").await;
    register(&app, "mallory", "pass1").await;

    // Unauthenticated
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/credit",
            &serde_json::json!({"login": "mallory", "amount": 100}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Authenticated but not admin
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/credit",
            &serde_json::json!({"login": "mallory", "amount": 100}),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // No write happened
    assert_eq!(roster_entry(&app, "mallory").await["coins"], 0);
}

#[tokio::test]
async fn test_admin_validation_errors() {
    let app = spawn_app().await;

    register(&app, "alice", "pass1").await;
    let admin = login(&app, BOOTSTRAP_LOGIN, BOOTSTRAP_PASSWORD).await;

    // Unknown target
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/credit",
            &serde_json::json!({"login": "nobody", "amount": 100}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Non-positive amounts
    for amount in [0, -5] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/admin/coins/credit",
                &serde_json::json!({"login": "alice", "amount": amount}),
                Some(&admin),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Prefix outside the fixed set
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/admin/prefix",
            &serde_json::json!({"login": "alice", "prefix": "owner"}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_settings_partial_update() {
    let app = spawn_app().await;

    let (alice, _) = register(&app, "alice", "pass1").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/settings",
            &serde_json::json!({"telegram_linked": true}),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&alice)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let account = &body["data"]["account"];
    assert_eq!(account["telegram_linked"], true);
    assert_eq!(account["two_factor_enabled"], false);
    assert_eq!(account["discord_linked"], false);

    // A later patch leaves the earlier flag in place
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/settings",
            &serde_json::json!({"two_factor_enabled": true}),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&alice)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let account = &body["data"]["account"];
    assert_eq!(account["telegram_linked"], true);
    assert_eq!(account["two_factor_enabled"], true);

    // Settings require a session
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/settings",
            &serde_json::json!({"telegram_linked": true}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_roster_order_and_convergence() {
    let app = spawn_app().await;

    register(&app, "first", "pass1").await;
    register(&app, "second", "pass1").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/accounts", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let roster = body["data"].as_array().unwrap();

    // Newest first; the bootstrap admin was created before either
    assert_eq!(roster[0]["login"], "second");
    assert_eq!(roster[1]["login"], "first");
    assert_eq!(roster.last().unwrap()["login"], "admin");

    // A completed credit is visible to the very next roster read
    let admin = login(&app, BOOTSTRAP_LOGIN, BOOTSTRAP_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/coins/credit",
            &serde_json::json!({"login": "first", "amount": 42}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(roster_entry(&app, "first").await["coins"], 42);
}

#[tokio::test]
async fn test_system_status() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/system/status", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["db_ready"], true);
    assert_eq!(body["data"]["total_accounts"], 1);
    assert_eq!(body["data"]["admin_accounts"], 1);
    assert!(body["data"]["version"].is_string());
}
