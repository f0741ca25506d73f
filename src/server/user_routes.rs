//! Profile, search and follow routes.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::api_error::ApiResult;
use super::extractors::{ApiJson, ApiPath, ApiQuery, SearchQuery};
use super::session::{viewer, Session};
use super::state::{GuardedSocialGraph, GuardedUserManager, ServerState};
use crate::user::ProfileUpdate;

const DEFAULT_SUGGESTED_USERS: usize = 5;

#[derive(Debug, Deserialize)]
struct SuggestedQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct FollowState {
    following: bool,
}

async fn search_users(
    session: Option<Session>,
    State(users): State<GuardedUserManager>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(users.search_users(&query.query, viewer(&session))?))
}

async fn suggested_users(
    session: Option<Session>,
    State(users): State<GuardedUserManager>,
    ApiQuery(query): ApiQuery<SuggestedQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_SUGGESTED_USERS);
    Ok(Json(users.suggested_users(viewer(&session), limit)?))
}

async fn get_user_by_username(
    session: Option<Session>,
    State(users): State<GuardedUserManager>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        users.get_profile_by_username(&username, viewer(&session))?,
    ))
}

async fn get_user(
    session: Option<Session>,
    State(users): State<GuardedUserManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(users.get_profile(id, viewer(&session))?))
}

async fn update_user(
    session: Session,
    State(users): State<GuardedUserManager>,
    ApiPath(id): ApiPath<usize>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(users.update_profile(id, session.user_id, update)?))
}

async fn follow_user(
    session: Session,
    State(graph): State<GuardedSocialGraph>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    graph.follow(session.user_id, id)?;
    Ok(Json(FollowState { following: true }))
}

async fn unfollow_user(
    session: Session,
    State(graph): State<GuardedSocialGraph>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    graph.unfollow(session.user_id, id)?;
    Ok(Json(FollowState { following: false }))
}

async fn is_following(
    session: Session,
    State(graph): State<GuardedSocialGraph>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(FollowState {
        following: graph.is_following(session.user_id, id)?,
    }))
}

async fn list_followers(
    session: Option<Session>,
    State(graph): State<GuardedSocialGraph>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(graph.list_followers(id, viewer(&session))?))
}

async fn list_following(
    session: Option<Session>,
    State(graph): State<GuardedSocialGraph>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(graph.list_following(id, viewer(&session))?))
}

/// - GET /search?query=
/// - GET /suggested?limit=
/// - GET /by-username/{username}
/// - GET|PUT /{id}
/// - GET|POST|DELETE /{id}/follow
/// - GET /{id}/followers
/// - GET /{id}/following
pub fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/search", get(search_users))
        .route("/suggested", get(suggested_users))
        .route("/by-username/{username}", get(get_user_by_username))
        .route("/{id}", get(get_user).put(update_user))
        .route(
            "/{id}/follow",
            get(is_following).post(follow_user).delete(unfollow_user),
        )
        .route("/{id}/followers", get(list_followers))
        .route("/{id}/following", get(list_following))
}
