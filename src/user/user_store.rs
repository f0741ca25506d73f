use super::user_models::{NewUser, User};
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns the user id.
    /// Fails with a UNIQUE violation if the username or email is taken.
    fn create_user(&self, user: &NewUser) -> Result<usize>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Matches either column, usernames take precedence.
    fn get_user_by_username_or_email(&self, username_or_email: &str) -> Result<Option<User>>;

    fn is_username_taken(&self, username: &str) -> Result<bool>;

    fn is_email_taken(&self, email: &str) -> Result<bool>;

    /// Overwrites the given fields, `None` leaves a field unchanged.
    /// Returns false if the user does not exist.
    fn update_user_profile(
        &self,
        user_id: usize,
        name: Option<&str>,
        bio: Option<&str>,
        location: Option<&str>,
    ) -> Result<bool>;

    /// Case-insensitive substring match on username and name.
    fn search_users(&self, query: &str, limit: usize) -> Result<Vec<User>>;

    /// Users with the most followers first, optionally leaving one out.
    fn most_followed_users(&self, exclude: Option<usize>, limit: usize) -> Result<Vec<User>>;
}
