//! Registration, sign-in and session routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use super::api_error::{Ack, ApiResult};
use super::extractors::ApiJson;
use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::state::{GuardedUserManager, ServerState};
use crate::user::auth::TOKEN_VALIDITY_SECS;
use crate::user::{AuthSession, RegisterRequest};

#[derive(Deserialize, Debug)]
struct SigninBody {
    #[serde(alias = "email", alias = "username_or_email")]
    pub username: String,
    pub password: String,
}

fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((COOKIE_SESSION_TOKEN_KEY, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(TOKEN_VALIDITY_SECS))
        .build()
}

fn signed_in(jar: CookieJar, session: AuthSession) -> impl IntoResponse {
    let jar = jar.add(session_cookie(&session.token));
    (StatusCode::CREATED, jar, Json(session))
}

async fn signup(
    State(users): State<GuardedUserManager>,
    jar: CookieJar,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = users.register(body)?;
    Ok(signed_in(jar, session))
}

async fn signin(
    State(users): State<GuardedUserManager>,
    jar: CookieJar,
    ApiJson(body): ApiJson<SigninBody>,
) -> ApiResult<impl IntoResponse> {
    let session = users.authenticate(&body.username, &body.password)?;
    Ok(signed_in(jar, session))
}

async fn current_session(
    session: Session,
    State(users): State<GuardedUserManager>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(users.get_profile(session.user_id, Some(session.user_id))?))
}

/// Tokens are stateless, so logging out only clears the cookie.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(COOKIE_SESSION_TOKEN_KEY).path("/"));
    (jar, Ack::new("Logged out"))
}

/// - POST /signup
/// - POST /signin
/// - GET /session
/// - GET /logout
pub fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/session", get(current_session))
        .route("/logout", get(logout))
}
