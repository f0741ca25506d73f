use super::models::Story;
use crate::media::StoredMedia;
use crate::store::{Page, Paged};
use anyhow::Result;

/// Stories and their views. Every "active" query takes the reference time
/// and only returns stories with `expires_at > now`.
pub trait StoryStore: Send + Sync {
    fn insert_story(
        &self,
        user_id: usize,
        content: Option<&str>,
        media: &StoredMedia,
        created: i64,
        expires_at: i64,
    ) -> Result<Story>;

    /// Returns the story regardless of expiry.
    fn get_story(&self, story_id: usize) -> Result<Option<Story>>;

    /// Returns the deleted story, None if it did not exist.
    fn delete_story(&self, story_id: usize) -> Result<Option<Story>>;

    fn list_active_stories(&self, now: i64, page: Page) -> Result<Paged<Story>>;

    fn list_user_active_stories(&self, user_id: usize, now: i64) -> Result<Vec<Story>>;

    /// Active stories of the users `viewer_id` follows.
    fn list_followed_active_stories(&self, viewer_id: usize, now: i64) -> Result<Vec<Story>>;

    fn has_active_stories(&self, user_id: usize, now: i64) -> Result<bool>;

    /// Returns true if this is the first view by `user_id`.
    fn add_story_view(&self, story_id: usize, user_id: usize) -> Result<bool>;

    fn count_story_views(&self, story_id: usize) -> Result<usize>;

    fn has_viewed_story(&self, story_id: usize, user_id: usize) -> Result<bool>;

    /// Removes every story with `expires_at <= now` in one transaction and
    /// returns them, their views go with them.
    fn purge_expired_stories(&self, now: i64) -> Result<Vec<Story>>;
}
