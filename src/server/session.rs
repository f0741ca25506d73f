use super::api_error::ApiError;
use super::state::ServerState;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::convert::Infallible;
use tracing::debug;

/// An authenticated caller.
#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
const BEARER_SCHEME: &str = "Bearer";

fn extract_session_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .filter(|value| !value.is_empty())
        .map(|s| s.to_string())
}

/// Accepts `Bearer <token>` with any casing of the scheme, or a bare token.
fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        _ if value.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => value,
    };
    (!token.is_empty()).then(|| token.to_string())
}

/// The header wins over the cookie when it carries a token.
fn extract_session_token(parts: &Parts) -> Option<String> {
    extract_session_token_from_headers(parts).or_else(|| extract_session_token_from_cookies(parts))
}

fn extract_session_from_request_parts(parts: &Parts, ctx: &ServerState) -> Option<Session> {
    let token = match extract_session_token(parts) {
        None => {
            debug!("No token in headers nor cookies.");
            return None;
        }
        Some(x) => x,
    };

    match ctx.user_manager.resolve_caller(&token) {
        Some(user_id) => Some(Session { user_id }),
        None => {
            debug!("Token did not resolve to a user");
            None
        }
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx).ok_or_else(ApiError::unauthenticated)
    }
}

impl OptionalFromRequestParts<ServerState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(extract_session_from_request_parts(parts, ctx))
    }
}

/// The viewer id of an optional session.
pub fn viewer(session: &Option<Session>) -> Option<usize> {
    session.as_ref().map(|s| s.user_id)
}
