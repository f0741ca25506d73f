use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::info;

use super::api_error::ApiError;
use super::auth_routes::auth_routes;
use super::feedback_routes::feedback_routes;
use super::learning_plan_routes::learning_plan_routes;
use super::notification_routes::notification_routes;
use super::post_routes::post_routes;
use super::session::Session;
use super::story_routes::story_routes;
use super::user_routes::user_routes;
use super::{log_requests, state::ServerState};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub user_id: Option<usize>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        user_id: session.map(|s| s.user_id),
    };
    Json(stats)
}

async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}

pub fn make_app(state: ServerState) -> Router {
    let config = state.config.clone();

    let api_routes: Router<ServerState> = Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/posts", post_routes())
        .nest("/stories", story_routes())
        .nest("/notifications", notification_routes())
        .nest("/learning-plans", learning_plan_routes())
        .nest("/feedbacks", feedback_routes());

    Router::new()
        .route("/", get(home))
        .nest("/v1", api_routes)
        .nest_service(
            &config.uploads_base_url,
            ServeDir::new(&config.upload_dir),
        )
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(config.max_request_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

/// Serves until `shutdown` is cancelled.
pub async fn run_server(state: ServerState, shutdown: CancellationToken) -> Result<()> {
    let port = state.config.port;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("HTTP server stopped");
    Ok(())
}
