use super::models::{Comment, Post, PostType};
use crate::media::StoredMedia;
use crate::store::{Page, Paged};
use anyhow::Result;

/// Posts, their media, comments and likes. Listings are newest first.
pub trait ContentStore: Send + Sync {
    /// Inserts the post and its media rows atomically, media keep the given order.
    fn insert_post(
        &self,
        user_id: usize,
        content: &str,
        post_type: PostType,
        media: &[StoredMedia],
        created: i64,
    ) -> Result<Post>;

    fn get_post(&self, post_id: usize) -> Result<Option<Post>>;

    /// Returns false if the post does not exist.
    fn update_post(
        &self,
        post_id: usize,
        content: &str,
        post_type: PostType,
        updated: i64,
    ) -> Result<bool>;

    /// Deletes the post together with its media rows, comments and likes.
    /// Returns the deleted post, None if it did not exist.
    fn delete_post(&self, post_id: usize) -> Result<Option<Post>>;

    fn list_posts(&self, page: Page) -> Result<Paged<Post>>;

    fn list_user_posts(&self, user_id: usize, page: Page) -> Result<Paged<Post>>;

    /// Posts authored by users `viewer_id` follows.
    fn list_followed_posts(&self, viewer_id: usize, page: Page) -> Result<Paged<Post>>;

    /// Case-insensitive substring match on the post content.
    fn search_posts(&self, query: &str, page: Page) -> Result<Paged<Post>>;

    fn insert_comment(
        &self,
        post_id: usize,
        user_id: usize,
        content: &str,
        created: i64,
    ) -> Result<Comment>;

    fn get_comment(&self, comment_id: usize) -> Result<Option<Comment>>;

    /// Returns false if the comment does not exist.
    fn update_comment(&self, comment_id: usize, content: &str, updated: i64) -> Result<bool>;

    /// Returns false if the comment does not exist.
    fn delete_comment(&self, comment_id: usize) -> Result<bool>;

    fn list_comments(&self, post_id: usize, page: Page) -> Result<Paged<Comment>>;

    fn count_comments(&self, post_id: usize) -> Result<usize>;

    /// Returns true if the like is new.
    fn add_like(&self, post_id: usize, user_id: usize) -> Result<bool>;

    /// Returns true if a like was removed.
    fn remove_like(&self, post_id: usize, user_id: usize) -> Result<bool>;

    fn count_likes(&self, post_id: usize) -> Result<usize>;

    fn is_liked(&self, post_id: usize, user_id: usize) -> Result<bool>;
}
