//! End-to-end tests for authentication endpoints
//!
//! Tests signup, signin, logout, session tokens and authentication requirements.

mod common;

use common::{TestClient, TestServer, ALICE, BOB, TEST_PASS};
use reqwest::StatusCode;
use serde_json::Value;
use skillshare_server::user::auth::{TokenIssuer, TOKEN_VALIDITY_SECS};

#[tokio::test]
async fn test_signup_returns_token_and_profile() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .signup("carol", "carol@example.com", "secret-pass")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], "carol");
    assert_eq!(body["user"]["name"], "carol");
    assert_eq!(body["user"]["followers_count"], 0);

    // The session cookie is set too
    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "carol");
}

#[tokio::test]
async fn test_signup_with_duplicate_username_is_conflict() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.signup(ALICE, "another@example.com", "secret-pass").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().is_some());

    let response = client.signup("newname", "alice@example.com", "secret-pass").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_with_invalid_fields_reports_each_field() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.signup("x", "not-an-email", "123").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["errors"]["username"].is_string());
    assert!(body["errors"]["email"].is_string());
    assert!(body["errors"]["password"].is_string());
}

#[tokio::test]
async fn test_signin_with_valid_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.signin(ALICE, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["id"], server.alice_id);
}

#[tokio::test]
async fn test_signin_with_email() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.signin("bob@example.com", TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_signin_with_invalid_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.signin(ALICE, "wrong_password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client.signin("nonexistent_user", TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_endpoint_requires_authentication() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_feed().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_public_reads_work_without_authentication() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_user(server.alice_id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.list_posts().await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone(), BOB).await;

    let response = client.get_feed().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get_feed().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_authenticates() {
    let server = TestServer::spawn().await;
    let signer = TestClient::new(server.base_url.clone());
    let body: Value = signer.signin(ALICE, TEST_PASS).await.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // A fresh client without cookies
    let client = TestClient::new(server.base_url.clone());
    let response = client.get_session_with_token(&token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], server.alice_id);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let now = chrono::Utc::now().timestamp();
    let token = server.token_issued_at(server.alice_id, now - TOKEN_VALIDITY_SECS - 60);

    let response = client.get_session_with_token(&token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_with_bad_signature_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let now = chrono::Utc::now().timestamp();
    let token = TokenIssuer::new(b"some-other-secret-entirely")
        .issue(server.alice_id, now)
        .unwrap();

    let response = client.get_session_with_token(&token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client.get_session_with_token("not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_home_endpoint() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(body.get("uptime").is_some());
    assert!(body.get("hash").is_some());
}
