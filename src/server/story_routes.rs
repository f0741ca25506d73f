use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

use super::api_error::{Ack, ApiError, ApiResult};
use super::extractors::{ApiPath, ApiQuery, PageQuery};
use super::multipart_form::MultipartForm;
use super::session::Session;
use super::state::{GuardedFeedAssembler, GuardedStoryManager, ServerState};

const MEDIA_FIELD: &str = "media";

#[derive(Debug, Serialize)]
struct ViewResult {
    first_view: bool,
}

async fn list_stories(
    session: Session,
    State(stories): State<GuardedStoryManager>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        stories.list_active_stories(query.page(), Some(session.user_id))?,
    ))
}

async fn story_feed(
    session: Session,
    State(feed): State<GuardedFeedAssembler>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(feed.assemble_story_feed(session.user_id)?))
}

async fn list_user_stories(
    session: Session,
    State(stories): State<GuardedStoryManager>,
    ApiPath(user_id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        stories.list_user_stories(user_id, Some(session.user_id))?,
    ))
}

async fn create_story(
    session: Session,
    State(stories): State<GuardedStoryManager>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = MultipartForm::read(multipart, &[MEDIA_FIELD]).await?;
    let upload = form
        .take_files(MEDIA_FIELD)
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::bad_request("A story needs a 'media' file"))?;
    let content = form.text("content").map(str::to_string);
    let story = stories
        .create_story(session.user_id, content, upload)
        .await?;
    Ok((StatusCode::CREATED, Json(story)))
}

async fn view_story(
    session: Session,
    State(stories): State<GuardedStoryManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    let first_view = stories.view_story(id, session.user_id)?;
    Ok(Json(ViewResult { first_view }))
}

async fn delete_story(
    session: Session,
    State(stories): State<GuardedStoryManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    stories.delete_story(id, session.user_id).await?;
    Ok(Ack::new("Story deleted"))
}

/// Every story route needs a session.
///
/// - GET|POST /
/// - GET /feed
/// - GET /user/{user_id}
/// - POST /{id}/view
/// - DELETE /{id}
pub fn story_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_stories).post(create_story))
        .route("/feed", get(story_feed))
        .route("/user/{user_id}", get(list_user_stories))
        .route("/{id}/view", post(view_story))
        .route("/{id}", delete(delete_story))
}
