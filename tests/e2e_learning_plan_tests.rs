//! End-to-end tests for learning plans

mod common;

use common::{TestClient, TestServer, ALICE, BOB};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn rust_plan() -> Value {
    json!({
        "title": "Learn Rust",
        "description": "From zero to async",
        "start_date": "2024-01-01",
        "end_date": "2024-06-30",
        "topics": [
            { "name": "Ownership", "completed": true },
            { "name": "Borrowing", "completed": true },
            { "title": "Lifetimes" },
            { "name": "Traits", "resources": "The Book, chapter 10" }
        ]
    })
}

#[tokio::test]
async fn test_plan_progress_follows_topics() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE).await;

    let response = alice.create_plan(rust_plan()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let plan: Value = response.json().await.unwrap();
    assert_eq!(plan["progress"], 50);
    assert_eq!(plan["user_id"], server.alice_id);
    assert_eq!(plan["start_date"], "2024-01-01T00:00:00");

    let topics = plan["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 4);
    assert_eq!(topics[2]["name"], "Lifetimes");
    assert_eq!(topics[2]["completed"], false);

    let plan_id = plan["id"].as_u64().unwrap() as usize;
    let topic_id = topics[2]["id"].as_u64().unwrap() as usize;

    let response = alice.set_topic_completed(plan_id, topic_id, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    let plan: Value = response.json().await.unwrap();
    assert_eq!(plan["progress"], 75);

    let plan: Value = alice.get_plan(plan_id).await.json().await.unwrap();
    assert_eq!(plan["progress"], 75);

    let response = alice
        .update_plan(plan_id, json!({ "title": "Learn Rust again", "topics": [] }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let plan: Value = response.json().await.unwrap();
    assert_eq!(plan["progress"], 0);
    assert!(plan["topics"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_plan_validation_reports_fields() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE).await;

    let response = alice
        .create_plan(json!({
            "title": "  ",
            "start_date": "2024-06-01",
            "end_date": "2024-01-01",
        }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["title"].is_string());
    assert!(body["errors"]["end_date"].is_string());

    let response = alice
        .create_plan(json!({ "title": "Dates", "start_date": "someday" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_plan_only_owner_modifies() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE).await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB).await;

    let plan: Value = alice.create_plan(rust_plan()).await.json().await.unwrap();
    let plan_id = plan["id"].as_u64().unwrap() as usize;
    let topic_id = plan["topics"][0]["id"].as_u64().unwrap() as usize;

    let response = bob.update_plan(plan_id, rust_plan()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = bob.set_topic_completed(plan_id, topic_id, false).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = bob.delete_plan(plan_id).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Anyone can read it
    let response = bob.get_plan(plan_id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = alice.delete_plan(plan_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = alice.get_plan(plan_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plan_listing_and_search() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE).await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB).await;

    alice.create_plan(rust_plan()).await;
    bob.create_plan(json!({ "title": "Watercolor basics" }))
        .await;

    let all: Value = alice.list_plans().await.json().await.unwrap();
    assert_eq!(all["total"], 2);

    let mine: Value = alice.list_user_plans(server.alice_id).await.json().await.unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let found: Value = alice.search_plans("watercolor").await.json().await.unwrap();
    assert_eq!(found["total"], 1);
    assert_eq!(found["items"][0]["user_id"], server.bob_id);

    let unauthenticated = TestClient::new(server.base_url.clone());
    let response = unauthenticated.create_plan(rust_plan()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
