//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all skillshare-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// A PNG file part named `file_name`.
pub fn png_part(file_name: &str) -> Part {
    Part::bytes(PNG_BYTES.to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .expect("Invalid mime type")
}

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows.
    /// For most tests, use `authenticated()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client signed in as one of the seeded users
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String, username: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.signin(username, TEST_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Authentication of {} failed: {:?}",
            username,
            response.text().await
        );

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn post_json(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("POST request failed")
    }

    async fn put_json(&self, path: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("PUT request failed")
    }

    async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    async fn post_form(&self, path: &str, form: Form) -> Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Multipart request failed")
    }

    /// GET / with the server stats
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    /// GET on an absolute path, e.g. a media url
    pub async fn get_path(&self, path: &str) -> Response {
        self.get(path).await
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/signup
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Response {
        self.post_json(
            "/v1/auth/signup",
            json!({
                "username": username,
                "email": email,
                "password": password,
            }),
        )
        .await
    }

    /// POST /v1/auth/signin
    pub async fn signin(&self, username: &str, password: &str) -> Response {
        self.post_json(
            "/v1/auth/signin",
            json!({
                "username": username,
                "password": password,
            }),
        )
        .await
    }

    /// GET /v1/auth/session
    pub async fn get_session(&self) -> Response {
        self.get("/v1/auth/session").await
    }

    /// GET /v1/auth/session with an explicit bearer token
    pub async fn get_session_with_token(&self, token: &str) -> Response {
        self.client
            .get(self.url("/v1/auth/session"))
            .bearer_auth(token)
            .send()
            .await
            .expect("Session request failed")
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.get("/v1/auth/logout").await
    }

    // ========================================================================
    // User Endpoints
    // ========================================================================

    /// GET /v1/users/{id}
    pub async fn get_user(&self, id: usize) -> Response {
        self.get(&format!("/v1/users/{}", id)).await
    }

    /// GET /v1/users/by-username/{username}
    pub async fn get_user_by_username(&self, username: &str) -> Response {
        self.get(&format!("/v1/users/by-username/{}", username))
            .await
    }

    /// PUT /v1/users/{id}
    pub async fn update_user(&self, id: usize, body: Value) -> Response {
        self.put_json(&format!("/v1/users/{}", id), body).await
    }

    /// GET /v1/users/search?query=
    pub async fn search_users(&self, query: &str) -> Response {
        self.client
            .get(self.url("/v1/users/search"))
            .query(&[("query", query)])
            .send()
            .await
            .expect("User search request failed")
    }

    /// GET /v1/users/suggested
    pub async fn suggested_users(&self) -> Response {
        self.get("/v1/users/suggested").await
    }

    /// POST /v1/users/{id}/follow
    pub async fn follow(&self, id: usize) -> Response {
        self.client
            .post(self.url(&format!("/v1/users/{}/follow", id)))
            .send()
            .await
            .expect("Follow request failed")
    }

    /// DELETE /v1/users/{id}/follow
    pub async fn unfollow(&self, id: usize) -> Response {
        self.delete(&format!("/v1/users/{}/follow", id)).await
    }

    /// GET /v1/users/{id}/follow
    pub async fn is_following(&self, id: usize) -> Response {
        self.get(&format!("/v1/users/{}/follow", id)).await
    }

    /// GET /v1/users/{id}/followers
    pub async fn get_followers(&self, id: usize) -> Response {
        self.get(&format!("/v1/users/{}/followers", id)).await
    }

    /// GET /v1/users/{id}/following
    pub async fn get_following(&self, id: usize) -> Response {
        self.get(&format!("/v1/users/{}/following", id)).await
    }

    // ========================================================================
    // Post Endpoints
    // ========================================================================

    /// POST /v1/posts with a JSON `post` part and the given files
    pub async fn create_post(&self, content: &str, files: Vec<Part>) -> Response {
        let mut form = Form::new().text(
            "post",
            json!({ "content": content, "post_type": "skill_sharing" }).to_string(),
        );
        for file in files {
            form = form.part("files", file);
        }
        self.post_form("/v1/posts", form).await
    }

    /// POST /v1/posts with a caller-built form
    pub async fn create_post_form(&self, form: Form) -> Response {
        self.post_form("/v1/posts", form).await
    }

    /// GET /v1/posts/{id}
    pub async fn get_post(&self, id: usize) -> Response {
        self.get(&format!("/v1/posts/{}", id)).await
    }

    /// PUT /v1/posts/{id}
    pub async fn update_post(&self, id: usize, body: Value) -> Response {
        self.put_json(&format!("/v1/posts/{}", id), body).await
    }

    /// DELETE /v1/posts/{id}
    pub async fn delete_post(&self, id: usize) -> Response {
        self.delete(&format!("/v1/posts/{}", id)).await
    }

    /// GET /v1/posts
    pub async fn list_posts(&self) -> Response {
        self.get("/v1/posts").await
    }

    /// GET /v1/posts/user/{user_id}
    pub async fn list_user_posts(&self, user_id: usize) -> Response {
        self.get(&format!("/v1/posts/user/{}", user_id)).await
    }

    /// GET /v1/posts/search?query=
    pub async fn search_posts(&self, query: &str) -> Response {
        self.client
            .get(self.url("/v1/posts/search"))
            .query(&[("query", query)])
            .send()
            .await
            .expect("Post search request failed")
    }

    /// GET /v1/posts/feed
    pub async fn get_feed(&self) -> Response {
        self.get("/v1/posts/feed").await
    }

    // ========================================================================
    // Comment Endpoints
    // ========================================================================

    /// POST /v1/posts/{id}/comments
    pub async fn create_comment(&self, post_id: usize, content: &str) -> Response {
        self.post_json(
            &format!("/v1/posts/{}/comments", post_id),
            json!({ "content": content }),
        )
        .await
    }

    /// GET /v1/posts/{id}/comments
    pub async fn list_comments(&self, post_id: usize) -> Response {
        self.get(&format!("/v1/posts/{}/comments", post_id)).await
    }

    /// PUT /v1/posts/{id}/comments/{comment_id}
    pub async fn update_comment(&self, post_id: usize, comment_id: usize, content: &str) -> Response {
        self.put_json(
            &format!("/v1/posts/{}/comments/{}", post_id, comment_id),
            json!({ "content": content }),
        )
        .await
    }

    /// DELETE /v1/posts/{id}/comments/{comment_id}
    pub async fn delete_comment(&self, post_id: usize, comment_id: usize) -> Response {
        self.delete(&format!("/v1/posts/{}/comments/{}", post_id, comment_id))
            .await
    }

    // ========================================================================
    // Like Endpoints
    // ========================================================================

    /// POST /v1/posts/{id}/likes
    pub async fn like_post(&self, post_id: usize) -> Response {
        self.client
            .post(self.url(&format!("/v1/posts/{}/likes", post_id)))
            .send()
            .await
            .expect("Like request failed")
    }

    /// DELETE /v1/posts/{id}/likes
    pub async fn unlike_post(&self, post_id: usize) -> Response {
        self.delete(&format!("/v1/posts/{}/likes", post_id)).await
    }

    /// PUT /v1/posts/{id}/likes
    pub async fn toggle_like(&self, post_id: usize) -> Response {
        self.client
            .put(self.url(&format!("/v1/posts/{}/likes", post_id)))
            .send()
            .await
            .expect("Toggle like request failed")
    }

    /// GET /v1/posts/{id}/likes
    pub async fn like_status(&self, post_id: usize) -> Response {
        self.get(&format!("/v1/posts/{}/likes", post_id)).await
    }

    // ========================================================================
    // Story Endpoints
    // ========================================================================

    /// POST /v1/stories with a PNG and optional text
    pub async fn create_story(&self, content: Option<&str>) -> Response {
        let mut form = Form::new().part("media", png_part("story.png"));
        if let Some(content) = content {
            form = form.text("content", content.to_string());
        }
        self.post_form("/v1/stories", form).await
    }

    /// POST /v1/stories with a caller-built form
    pub async fn create_story_form(&self, form: Form) -> Response {
        self.post_form("/v1/stories", form).await
    }

    /// GET /v1/stories
    pub async fn list_stories(&self) -> Response {
        self.get("/v1/stories").await
    }

    /// GET /v1/stories/feed
    pub async fn get_story_feed(&self) -> Response {
        self.get("/v1/stories/feed").await
    }

    /// GET /v1/stories/user/{user_id}
    pub async fn list_user_stories(&self, user_id: usize) -> Response {
        self.get(&format!("/v1/stories/user/{}", user_id)).await
    }

    /// POST /v1/stories/{id}/view
    pub async fn view_story(&self, id: usize) -> Response {
        self.client
            .post(self.url(&format!("/v1/stories/{}/view", id)))
            .send()
            .await
            .expect("View story request failed")
    }

    /// DELETE /v1/stories/{id}
    pub async fn delete_story(&self, id: usize) -> Response {
        self.delete(&format!("/v1/stories/{}", id)).await
    }

    // ========================================================================
    // Notification Endpoints
    // ========================================================================

    /// GET /v1/notifications
    pub async fn list_notifications(&self) -> Response {
        self.get("/v1/notifications").await
    }

    /// GET /v1/notifications/unread-count
    pub async fn unread_count(&self) -> Response {
        self.get("/v1/notifications/unread-count").await
    }

    /// Unread count as a number, panicking on failure
    pub async fn unread_count_value(&self) -> u64 {
        let response = self.unread_count().await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Invalid JSON");
        body["count"].as_u64().expect("Missing count")
    }

    /// PUT /v1/notifications/{id}/read
    pub async fn mark_notification_read(&self, id: usize) -> Response {
        self.put_json(&format!("/v1/notifications/{}/read", id), json!({}))
            .await
    }

    /// PUT /v1/notifications/read-all
    pub async fn mark_all_notifications_read(&self) -> Response {
        self.put_json("/v1/notifications/read-all", json!({})).await
    }

    /// DELETE /v1/notifications/{id}
    pub async fn delete_notification(&self, id: usize) -> Response {
        self.delete(&format!("/v1/notifications/{}", id)).await
    }

    // ========================================================================
    // Learning Plan Endpoints
    // ========================================================================

    /// POST /v1/learning-plans
    pub async fn create_plan(&self, body: Value) -> Response {
        self.post_json("/v1/learning-plans", body).await
    }

    /// GET /v1/learning-plans/{id}
    pub async fn get_plan(&self, id: usize) -> Response {
        self.get(&format!("/v1/learning-plans/{}", id)).await
    }

    /// PUT /v1/learning-plans/{id}
    pub async fn update_plan(&self, id: usize, body: Value) -> Response {
        self.put_json(&format!("/v1/learning-plans/{}", id), body)
            .await
    }

    /// DELETE /v1/learning-plans/{id}
    pub async fn delete_plan(&self, id: usize) -> Response {
        self.delete(&format!("/v1/learning-plans/{}", id)).await
    }

    /// GET /v1/learning-plans
    pub async fn list_plans(&self) -> Response {
        self.get("/v1/learning-plans").await
    }

    /// GET /v1/learning-plans/user/{user_id}
    pub async fn list_user_plans(&self, user_id: usize) -> Response {
        self.get(&format!("/v1/learning-plans/user/{}", user_id))
            .await
    }

    /// GET /v1/learning-plans/search?query=
    pub async fn search_plans(&self, query: &str) -> Response {
        self.client
            .get(self.url("/v1/learning-plans/search"))
            .query(&[("query", query)])
            .send()
            .await
            .expect("Plan search request failed")
    }

    /// PUT /v1/learning-plans/{id}/topics/{topic_id}
    pub async fn set_topic_completed(&self, plan_id: usize, topic_id: usize, completed: bool) -> Response {
        self.put_json(
            &format!("/v1/learning-plans/{}/topics/{}", plan_id, topic_id),
            json!({ "completed": completed }),
        )
        .await
    }

    // ========================================================================
    // Feedback Endpoints
    // ========================================================================

    /// POST /v1/feedbacks
    pub async fn create_feedback(&self, title: &str, content: &str, rating: i64) -> Response {
        self.post_json(
            "/v1/feedbacks",
            json!({ "title": title, "content": content, "rating": rating }),
        )
        .await
    }

    /// GET /v1/feedbacks
    pub async fn list_feedback(&self) -> Response {
        self.get("/v1/feedbacks").await
    }

    /// GET /v1/feedbacks/user
    pub async fn list_own_feedback(&self) -> Response {
        self.get("/v1/feedbacks/user").await
    }

    /// GET /v1/feedbacks/{id}
    pub async fn get_feedback(&self, id: usize) -> Response {
        self.get(&format!("/v1/feedbacks/{}", id)).await
    }

    /// PUT /v1/feedbacks/{id}
    pub async fn update_feedback(&self, id: usize, body: Value) -> Response {
        self.put_json(&format!("/v1/feedbacks/{}", id), body).await
    }

    /// DELETE /v1/feedbacks/{id}
    pub async fn delete_feedback(&self, id: usize) -> Response {
        self.delete(&format!("/v1/feedbacks/{}", id)).await
    }
}
