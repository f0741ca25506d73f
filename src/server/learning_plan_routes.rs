use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use super::api_error::{Ack, ApiResult};
use super::extractors::{ApiJson, ApiPath, ApiQuery, PageQuery, SearchQuery};
use super::session::Session;
use super::state::{GuardedLearningPlanManager, ServerState};
use crate::learning_plans::LearningPlanDraft;

#[derive(Debug, Deserialize)]
struct TopicUpdate {
    completed: bool,
}

async fn list_plans(
    State(plans): State<GuardedLearningPlanManager>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(plans.list_plans(query.page())?))
}

async fn create_plan(
    session: Session,
    State(plans): State<GuardedLearningPlanManager>,
    ApiJson(draft): ApiJson<LearningPlanDraft>,
) -> ApiResult<impl IntoResponse> {
    let plan = plans.create_plan(session.user_id, draft)?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn search_plans(
    State(plans): State<GuardedLearningPlanManager>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(plans.search_plans(&query.query, query.page())?))
}

async fn list_user_plans(
    State(plans): State<GuardedLearningPlanManager>,
    ApiPath(user_id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(plans.list_user_plans(user_id)?))
}

async fn get_plan(
    State(plans): State<GuardedLearningPlanManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(plans.get_plan(id)?))
}

async fn update_plan(
    session: Session,
    State(plans): State<GuardedLearningPlanManager>,
    ApiPath(id): ApiPath<usize>,
    ApiJson(draft): ApiJson<LearningPlanDraft>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(plans.update_plan(id, session.user_id, draft)?))
}

async fn delete_plan(
    session: Session,
    State(plans): State<GuardedLearningPlanManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    plans.delete_plan(id, session.user_id)?;
    Ok(Ack::new("Learning plan deleted"))
}

async fn update_topic(
    session: Session,
    State(plans): State<GuardedLearningPlanManager>,
    ApiPath((plan_id, topic_id)): ApiPath<(usize, usize)>,
    ApiJson(update): ApiJson<TopicUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(plans.set_topic_completed(
        plan_id,
        topic_id,
        session.user_id,
        update.completed,
    )?))
}

/// Reads are public, changes need the owner's session.
///
/// - GET|POST /
/// - GET /search?query=
/// - GET /user/{user_id}
/// - GET|PUT|DELETE /{id}
/// - PUT /{id}/topics/{topic_id}
pub fn learning_plan_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/search", get(search_plans))
        .route("/user/{user_id}", get(list_user_plans))
        .route("/{id}", get(get_plan).put(update_plan).delete(delete_plan))
        .route("/{id}/topics/{topic_id}", put(update_topic))
}
