use super::auth::{hash_password, verify_password, TokenIssuer};
use super::user_models::{
    AuthSession, NewUser, ProfileUpdate, RegisterRequest, User, UserProfile,
};
use crate::error::{is_unique_violation, FieldErrors, ServiceError, ServiceResult};
use crate::store::{unix_now, PlatformStore};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=32;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_SEARCH_RESULTS: usize = 50;
const MAX_SUGGESTED_USERS: usize = 50;

pub struct UserManager {
    store: Arc<dyn PlatformStore>,
    tokens: TokenIssuer,
}

/// Builds the profile of `user` as seen by `viewer`.
pub(crate) fn build_profile(
    store: &dyn PlatformStore,
    user: User,
    viewer: Option<usize>,
    now: i64,
) -> Result<UserProfile> {
    let is_following = match viewer {
        Some(viewer) if viewer != user.id => store.is_following(viewer, user.id)?,
        _ => false,
    };
    Ok(UserProfile {
        followers_count: store.count_followers(user.id)?,
        following_count: store.count_following(user.id)?,
        has_active_stories: store.has_active_stories(user.id, now)?,
        is_following,
        id: user.id,
        username: user.username,
        email: user.email,
        name: user.name,
        bio: user.bio,
        location: user.location,
        avatar_url: user.avatar_url,
        created: user.created,
    })
}

fn is_valid_username(username: &str) -> bool {
    USERNAME_LENGTH.contains(&username.chars().count())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

impl UserManager {
    pub fn new(store: Arc<dyn PlatformStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    pub fn register(&self, request: RegisterRequest) -> ServiceResult<AuthSession> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();

        let mut errors = FieldErrors::new();
        errors
            .check(
                is_valid_username(&username),
                "username",
                "Username must be 3 to 32 letters, digits, '_' or '.'",
            )
            .check(is_valid_email(&email), "email", "Email is not valid")
            .check(
                request.password.chars().count() >= MIN_PASSWORD_LENGTH,
                "password",
                "Password must be at least 6 characters",
            );
        errors.into_result()?;

        if self.store.is_username_taken(&username)? {
            return Err(ServiceError::DuplicateIdentity(
                "Username is already taken".to_string(),
            ));
        }
        if self.store.is_email_taken(&email)? {
            return Err(ServiceError::DuplicateIdentity(
                "Email is already in use".to_string(),
            ));
        }

        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| username.clone());
        let new_user = NewUser {
            password_hash: hash_password(&request.password)?,
            username,
            email,
            name,
        };

        let user_id = match self.store.create_user(&new_user) {
            Ok(id) => id,
            // Lost a race with a concurrent registration
            Err(err) if is_unique_violation(&err) => {
                return Err(ServiceError::DuplicateIdentity(
                    "Username or email is already in use".to_string(),
                ))
            }
            Err(err) => return Err(err.into()),
        };
        info!("Registered user {} ({})", new_user.username, user_id);

        self.session_for(user_id)
    }

    pub fn authenticate(&self, username_or_email: &str, password: &str) -> ServiceResult<AuthSession> {
        let user = self
            .store
            .get_user_by_username_or_email(username_or_email.trim())?
            .ok_or(ServiceError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash)? {
            debug!("Wrong password for user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }
        self.session_for(user.id)
    }

    /// Maps a bearer token to a user id. Invalid or expired tokens, and tokens
    /// of users that no longer exist, resolve to anonymous.
    pub fn resolve_caller(&self, token: &str) -> Option<usize> {
        let user_id = self.tokens.verify(token)?;
        match self.store.get_user(user_id) {
            Ok(Some(_)) => Some(user_id),
            Ok(None) => None,
            Err(err) => {
                debug!("Failed to look up caller {}: {}", user_id, err);
                None
            }
        }
    }

    pub fn get_profile(&self, user_id: usize, viewer: Option<usize>) -> ServiceResult<UserProfile> {
        let user = self
            .store
            .get_user(user_id)?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;
        Ok(build_profile(self.store.as_ref(), user, viewer, unix_now())?)
    }

    pub fn get_profile_by_username(
        &self,
        username: &str,
        viewer: Option<usize>,
    ) -> ServiceResult<UserProfile> {
        let user = self.store.get_user_by_username(username)?.ok_or_else(|| {
            ServiceError::NotFound(format!("User not found with username: {}", username))
        })?;
        Ok(build_profile(self.store.as_ref(), user, viewer, unix_now())?)
    }

    pub fn update_profile(
        &self,
        user_id: usize,
        caller: usize,
        update: ProfileUpdate,
    ) -> ServiceResult<UserProfile> {
        if self.store.get_user(user_id)?.is_none() {
            return Err(ServiceError::not_found("User", user_id));
        }
        if user_id != caller {
            return Err(ServiceError::NotAuthorized(
                "You can only update your own profile".to_string(),
            ));
        }
        let name = update.name.as_deref().map(str::trim);
        if name == Some("") {
            return Err(ServiceError::invalid_field("name", "Name cannot be blank"));
        }
        self.store.update_user_profile(
            user_id,
            name,
            update.bio.as_deref(),
            update.location.as_deref(),
        )?;
        self.get_profile(user_id, Some(caller))
    }

    pub fn search_users(&self, query: &str, viewer: Option<usize>) -> ServiceResult<Vec<UserProfile>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        let now = unix_now();
        self.store
            .search_users(query, MAX_SEARCH_RESULTS)?
            .into_iter()
            .map(|user| -> ServiceResult<UserProfile> {
                Ok(build_profile(self.store.as_ref(), user, viewer, now)?)
            })
            .collect()
    }

    pub fn suggested_users(&self, viewer: Option<usize>, limit: usize) -> ServiceResult<Vec<UserProfile>> {
        let now = unix_now();
        self.store
            .most_followed_users(viewer, limit.clamp(1, MAX_SUGGESTED_USERS))?
            .into_iter()
            .map(|user| -> ServiceResult<UserProfile> {
                Ok(build_profile(self.store.as_ref(), user, viewer, now)?)
            })
            .collect()
    }

    fn session_for(&self, user_id: usize) -> ServiceResult<AuthSession> {
        let token = self.tokens.issue(user_id, unix_now())?;
        let user = self.get_profile(user_id, Some(user_id))?;
        Ok(AuthSession { token, user })
    }
}
