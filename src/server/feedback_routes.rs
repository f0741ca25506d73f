use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::api_error::{Ack, ApiResult};
use super::extractors::{ApiJson, ApiPath};
use super::session::Session;
use super::state::{GuardedFeedbackManager, ServerState};
use crate::feedback::FeedbackDraft;

async fn list_feedback(
    State(feedback): State<GuardedFeedbackManager>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(feedback.list_all()?))
}

async fn create_feedback(
    session: Session,
    State(feedback): State<GuardedFeedbackManager>,
    ApiJson(draft): ApiJson<FeedbackDraft>,
) -> ApiResult<impl IntoResponse> {
    let created = feedback.create(session.user_id, draft)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_own_feedback(
    session: Session,
    State(feedback): State<GuardedFeedbackManager>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(feedback.list_by_user(session.user_id)?))
}

async fn get_feedback(
    State(feedback): State<GuardedFeedbackManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(feedback.get(id)?))
}

async fn update_feedback(
    session: Session,
    State(feedback): State<GuardedFeedbackManager>,
    ApiPath(id): ApiPath<usize>,
    ApiJson(draft): ApiJson<FeedbackDraft>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(feedback.update(id, session.user_id, draft)?))
}

async fn delete_feedback(
    session: Session,
    State(feedback): State<GuardedFeedbackManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    feedback.delete(id, session.user_id)?;
    Ok(Ack::new("Feedback deleted"))
}

/// - GET|POST /
/// - GET /user (the caller's own)
/// - GET|PUT|DELETE /{id}
pub fn feedback_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_feedback).post(create_feedback))
        .route("/user", get(list_own_feedback))
        .route(
            "/{id}",
            get(get_feedback).put(update_feedback).delete(delete_feedback),
        )
}
