use axum::{
    extract::State,
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Serialize;

use super::api_error::{Ack, ApiResult};
use super::extractors::{ApiPath, ApiQuery, PageQuery};
use super::session::Session;
use super::state::{GuardedNotificationService, ServerState};

#[derive(Debug, Serialize)]
struct UnreadCount {
    count: usize,
}

#[derive(Debug, Serialize)]
struct MarkedRead {
    updated: usize,
}

async fn list_notifications(
    session: Session,
    State(notifications): State<GuardedNotificationService>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(notifications.list(session.user_id, query.page())?))
}

async fn unread_count(
    session: Session,
    State(notifications): State<GuardedNotificationService>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(UnreadCount {
        count: notifications.unread_count(session.user_id)?,
    }))
}

async fn mark_read(
    session: Session,
    State(notifications): State<GuardedNotificationService>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    notifications.mark_read(id, session.user_id)?;
    Ok(Ack::new("Notification marked as read"))
}

async fn mark_all_read(
    session: Session,
    State(notifications): State<GuardedNotificationService>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(MarkedRead {
        updated: notifications.mark_all_read(session.user_id)?,
    }))
}

async fn delete_notification(
    session: Session,
    State(notifications): State<GuardedNotificationService>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<impl IntoResponse> {
    notifications.delete(id, session.user_id)?;
    Ok(Ack::new("Notification deleted"))
}

/// - GET /
/// - GET /unread-count
/// - PUT /read-all
/// - PUT /{id}/read
/// - DELETE /{id}
pub fn notification_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/{id}/read", put(mark_read))
        .route("/{id}", delete(delete_notification))
}
