//! Posts, comments and likes.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::api_error::{Ack, ApiError, ApiResult};
use super::extractors::{ApiJson, ApiPath, ApiQuery, PageQuery, SearchQuery};
use super::multipart_form::MultipartForm;
use super::session::{viewer, Session};
use super::state::{GuardedContentManager, GuardedFeedAssembler, ServerState};
use crate::content::{PostDraft, PostType};

const POST_FIELD: &str = "post";
const FILES_FIELD: &str = "files";

#[derive(Debug, Deserialize)]
struct CommentBody {
    content: String,
}

/// The draft comes either as a JSON `post` part or as plain `content` and
/// `post_type` parts.
fn read_post_draft(form: &MultipartForm) -> ApiResult<PostDraft> {
    if form.text(POST_FIELD).is_some() {
        return form.json(POST_FIELD);
    }
    let post_type = match form.text("post_type") {
        Some(raw) => raw
            .parse::<PostType>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => PostType::default(),
    };
    Ok(PostDraft {
        content: form.text("content").unwrap_or_default().to_string(),
        post_type,
    })
}

async fn list_posts(
    session: Option<Session>,
    State(content): State<GuardedContentManager>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.list_posts(query.page(), viewer(&session))?))
}

async fn create_post(
    session: Session,
    State(content): State<GuardedContentManager>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = MultipartForm::read(multipart, &[FILES_FIELD]).await?;
    let draft = read_post_draft(&form)?;
    let uploads = form.take_files(FILES_FIELD);
    let post = content.create_post(session.user_id, draft, uploads).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_feed(
    session: Session,
    State(feed): State<GuardedFeedAssembler>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(feed.assemble_feed(session.user_id, query.page())?))
}

async fn search_posts(
    session: Option<Session>,
    State(content): State<GuardedContentManager>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.search_posts(
        &query.query,
        query.page(),
        viewer(&session),
    )?))
}

async fn list_user_posts(
    session: Option<Session>,
    State(content): State<GuardedContentManager>,
    ApiPath(user_id): ApiPath<usize>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.list_user_posts(
        user_id,
        query.page(),
        viewer(&session),
    )?))
}

async fn get_post(
    session: Option<Session>,
    State(content): State<GuardedContentManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.get_post(id, viewer(&session))?))
}

async fn update_post(
    session: Session,
    State(content): State<GuardedContentManager>,
    ApiPath(id): ApiPath<usize>,
    ApiJson(draft): ApiJson<PostDraft>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.update_post(id, session.user_id, draft)?))
}

async fn delete_post(
    session: Session,
    State(content): State<GuardedContentManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    content.delete_post(id, session.user_id).await?;
    Ok(Ack::new("Post deleted"))
}

async fn list_comments(
    State(content): State<GuardedContentManager>,
    ApiPath(post_id): ApiPath<usize>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.list_comments(post_id, query.page())?))
}

async fn create_comment(
    session: Session,
    State(content): State<GuardedContentManager>,
    ApiPath(post_id): ApiPath<usize>,
    ApiJson(body): ApiJson<CommentBody>,
) -> ApiResult<impl IntoResponse> {
    let comment = content
        .create_comment(post_id, session.user_id, &body.content)?
        .into_value();
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn get_comment(
    State(content): State<GuardedContentManager>,
    ApiPath((post_id, comment_id)): ApiPath<(usize, usize)>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.get_comment(post_id, comment_id)?))
}

async fn update_comment(
    session: Session,
    State(content): State<GuardedContentManager>,
    ApiPath((post_id, comment_id)): ApiPath<(usize, usize)>,
    ApiJson(body): ApiJson<CommentBody>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.update_comment(
        post_id,
        comment_id,
        session.user_id,
        &body.content,
    )?))
}

async fn delete_comment(
    session: Session,
    State(content): State<GuardedContentManager>,
    ApiPath((post_id, comment_id)): ApiPath<(usize, usize)>,
) -> ApiResult<impl IntoResponse> {
    content.delete_comment(post_id, comment_id, session.user_id)?;
    Ok(Ack::new("Comment deleted"))
}

async fn like_status(
    session: Option<Session>,
    State(content): State<GuardedContentManager>,
    ApiPath(post_id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.like_status(post_id, viewer(&session))?))
}

async fn like_post(
    session: Session,
    State(content): State<GuardedContentManager>,
    ApiPath(post_id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.like_post(post_id, session.user_id)?.into_value()))
}

async fn toggle_like(
    session: Session,
    State(content): State<GuardedContentManager>,
    ApiPath(post_id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        content.toggle_like(post_id, session.user_id)?.into_value(),
    ))
}

async fn unlike_post(
    session: Session,
    State(content): State<GuardedContentManager>,
    ApiPath(post_id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(content.unlike_post(post_id, session.user_id)?))
}

/// - GET|POST /
/// - GET /feed
/// - GET /search?query=
/// - GET /user/{user_id}
/// - GET|PUT|DELETE /{id}
/// - GET|POST /{id}/comments
/// - GET|PUT|DELETE /{id}/comments/{comment_id}
/// - GET|POST|PUT|DELETE /{id}/likes
pub fn post_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/feed", get(get_feed))
        .route("/search", get(search_posts))
        .route("/user/{user_id}", get(list_user_posts))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/{id}/comments", get(list_comments).post(create_comment))
        .route(
            "/{id}/comments/{comment_id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route(
            "/{id}/likes",
            get(like_status)
                .post(like_post)
                .put(toggle_like)
                .delete(unlike_post),
        )
}
