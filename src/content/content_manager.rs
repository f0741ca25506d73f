use super::models::{Comment, CommentView, LikeStatus, Post, PostDraft};
use crate::error::{ServiceError, ServiceResult};
use crate::feed::{decorate_post, decorate_posts, DecoratedPost};
use crate::media::{MediaStorage, MediaUpload, StoredMedia};
use crate::notifications::{NotificationService, NotificationType};
use crate::outcome::Outcome;
use crate::store::{unix_now, Page, Paged, PlatformStore};
use crate::user::{User, UserSummary};
use std::sync::Arc;
use tracing::{debug, info};

/// Attachments past this many are dropped.
pub const MAX_ATTACHMENTS: usize = 3;

pub struct ContentManager {
    store: Arc<dyn PlatformStore>,
    media: Arc<MediaStorage>,
    notifications: Arc<NotificationService>,
}

fn require_content(content: &str) -> ServiceResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::invalid_field(
            "content",
            "Content must not be blank",
        ));
    }
    Ok(content.to_string())
}

impl ContentManager {
    pub fn new(
        store: Arc<dyn PlatformStore>,
        media: Arc<MediaStorage>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            store,
            media,
            notifications,
        }
    }

    fn require_user(&self, user_id: usize) -> ServiceResult<User> {
        self.store
            .get_user(user_id)?
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    fn require_post(&self, post_id: usize) -> ServiceResult<Post> {
        self.store
            .get_post(post_id)?
            .ok_or_else(|| ServiceError::not_found("Post", post_id))
    }

    /// The comment `comment_id`, only if it is attached to `post_id`.
    fn require_comment(&self, post_id: usize, comment_id: usize) -> ServiceResult<Comment> {
        self.store
            .get_comment(comment_id)?
            .filter(|comment| comment.post_id == post_id)
            .ok_or_else(|| ServiceError::not_found("Comment", comment_id))
    }

    fn comment_view(&self, comment: Comment) -> ServiceResult<CommentView> {
        let author = self.require_user(comment.user_id)?;
        Ok(CommentView {
            author: UserSummary::from(&author),
            comment,
        })
    }

    async fn discard_media(&self, stored: &[StoredMedia]) {
        let urls: Vec<&str> = stored.iter().map(|m| m.url.as_str()).collect();
        self.media.delete_all_best_effort(&urls).await;
    }

    /// Publishes a post. Every attachment is validated before any file is
    /// written, at most [`MAX_ATTACHMENTS`] are kept.
    pub async fn create_post(
        &self,
        owner: usize,
        draft: PostDraft,
        mut uploads: Vec<MediaUpload>,
    ) -> ServiceResult<DecoratedPost> {
        let content = require_content(&draft.content)?;
        if uploads.len() > MAX_ATTACHMENTS {
            debug!(
                "Dropping {} attachments past the first {}",
                uploads.len() - MAX_ATTACHMENTS,
                MAX_ATTACHMENTS
            );
            uploads.truncate(MAX_ATTACHMENTS);
        }
        self.media.validate_all(&uploads)?;

        let mut stored = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            match self.media.store(upload).await {
                Ok(media) => stored.push(media),
                Err(err) => {
                    self.discard_media(&stored).await;
                    return Err(err.into());
                }
            }
        }

        let post = match self
            .store
            .insert_post(owner, &content, draft.post_type, &stored, unix_now())
        {
            Ok(post) => post,
            Err(err) => {
                self.discard_media(&stored).await;
                return Err(err.into());
            }
        };
        info!(
            "User {} created post {} with {} attachments",
            owner,
            post.id,
            post.media.len()
        );
        Ok(decorate_post(self.store.as_ref(), post, Some(owner))?)
    }

    pub fn update_post(
        &self,
        post_id: usize,
        caller: usize,
        draft: PostDraft,
    ) -> ServiceResult<DecoratedPost> {
        let post = self.require_post(post_id)?;
        if post.user_id != caller {
            return Err(ServiceError::NotAuthorized(
                "You can only update your own posts".to_string(),
            ));
        }
        let content = require_content(&draft.content)?;
        if !self
            .store
            .update_post(post_id, &content, draft.post_type, unix_now())?
        {
            return Err(ServiceError::not_found("Post", post_id));
        }
        self.get_post(post_id, Some(caller))
    }

    /// Deletes the post with its comments, likes and media rows, then its
    /// media files. Files that cannot be removed are reported in the outcome.
    pub async fn delete_post(&self, post_id: usize, caller: usize) -> ServiceResult<Outcome<()>> {
        let post = self.require_post(post_id)?;
        if post.user_id != caller {
            return Err(ServiceError::NotAuthorized(
                "You can only delete your own posts".to_string(),
            ));
        }

        let mut outcome = Outcome::new(());
        if let Some(deleted) = self.store.delete_post(post_id)? {
            info!("User {} deleted post {}", caller, post_id);
            let urls: Vec<&str> = deleted.media_urls().collect();
            outcome.extend(self.media.delete_all_best_effort(&urls).await);
        }
        Ok(outcome)
    }

    pub fn get_post(&self, post_id: usize, viewer: Option<usize>) -> ServiceResult<DecoratedPost> {
        let post = self.require_post(post_id)?;
        Ok(decorate_post(self.store.as_ref(), post, viewer)?)
    }

    pub fn list_posts(
        &self,
        page: Page,
        viewer: Option<usize>,
    ) -> ServiceResult<Paged<DecoratedPost>> {
        let posts = self.store.list_posts(page)?;
        Ok(decorate_posts(self.store.as_ref(), posts, viewer)?)
    }

    pub fn list_user_posts(
        &self,
        user_id: usize,
        page: Page,
        viewer: Option<usize>,
    ) -> ServiceResult<Paged<DecoratedPost>> {
        self.require_user(user_id)?;
        let posts = self.store.list_user_posts(user_id, page)?;
        Ok(decorate_posts(self.store.as_ref(), posts, viewer)?)
    }

    pub fn search_posts(
        &self,
        query: &str,
        page: Page,
        viewer: Option<usize>,
    ) -> ServiceResult<Paged<DecoratedPost>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Paged::new(vec![], page, 0));
        }
        let posts = self.store.search_posts(query, page)?;
        Ok(decorate_posts(self.store.as_ref(), posts, viewer)?)
    }

    /// Comments on a post and notifies its owner.
    pub fn create_comment(
        &self,
        post_id: usize,
        caller: usize,
        content: &str,
    ) -> ServiceResult<Outcome<CommentView>> {
        let post = self.require_post(post_id)?;
        let author = self.require_user(caller)?;
        let content = require_content(content)?;

        let comment = self
            .store
            .insert_comment(post_id, caller, &content, unix_now())?;
        let mut outcome = Outcome::new(CommentView {
            author: UserSummary::from(&author),
            comment,
        });
        outcome.absorb(self.notifications.notify(
            post.user_id,
            caller,
            &format!("{} commented on your post", author.username),
            NotificationType::Comment,
            Some(post_id),
        ));
        Ok(outcome)
    }

    pub fn update_comment(
        &self,
        post_id: usize,
        comment_id: usize,
        caller: usize,
        content: &str,
    ) -> ServiceResult<CommentView> {
        let comment = self.require_comment(post_id, comment_id)?;
        if comment.user_id != caller {
            return Err(ServiceError::NotAuthorized(
                "You can only update your own comments".to_string(),
            ));
        }
        let content = require_content(content)?;
        if !self
            .store
            .update_comment(comment_id, &content, unix_now())?
        {
            return Err(ServiceError::not_found("Comment", comment_id));
        }
        self.get_comment(post_id, comment_id)
    }

    /// The comment author and the post owner may delete a comment.
    pub fn delete_comment(
        &self,
        post_id: usize,
        comment_id: usize,
        caller: usize,
    ) -> ServiceResult<()> {
        let comment = self.require_comment(post_id, comment_id)?;
        let post = self.require_post(post_id)?;
        if comment.user_id != caller && post.user_id != caller {
            return Err(ServiceError::NotAuthorized(
                "You can only delete your own comments or comments on your posts".to_string(),
            ));
        }
        self.store.delete_comment(comment_id)?;
        Ok(())
    }

    pub fn get_comment(&self, post_id: usize, comment_id: usize) -> ServiceResult<CommentView> {
        let comment = self.require_comment(post_id, comment_id)?;
        self.comment_view(comment)
    }

    pub fn list_comments(&self, post_id: usize, page: Page) -> ServiceResult<Paged<CommentView>> {
        self.require_post(post_id)?;
        let comments = self.store.list_comments(post_id, page)?;
        comments.try_map(|comment| self.comment_view(comment))
    }

    /// Likes a post. Liking twice changes nothing, only a new like notifies the owner.
    pub fn like_post(&self, post_id: usize, caller: usize) -> ServiceResult<Outcome<LikeStatus>> {
        let post = self.require_post(post_id)?;
        let created = self.store.add_like(post_id, caller)?;
        let mut outcome = Outcome::new(self.like_status(post_id, Some(caller))?);
        if created {
            let liker = self.require_user(caller)?;
            outcome.absorb(self.notifications.notify(
                post.user_id,
                caller,
                &format!("{} liked your post", liker.username),
                NotificationType::Like,
                Some(post_id),
            ));
        }
        Ok(outcome)
    }

    pub fn unlike_post(&self, post_id: usize, caller: usize) -> ServiceResult<LikeStatus> {
        self.require_post(post_id)?;
        self.store.remove_like(post_id, caller)?;
        self.like_status(post_id, Some(caller))
    }

    /// Flips the caller's like and returns the new state.
    pub fn toggle_like(&self, post_id: usize, caller: usize) -> ServiceResult<Outcome<LikeStatus>> {
        self.require_post(post_id)?;
        if self.store.is_liked(post_id, caller)? {
            Ok(Outcome::new(self.unlike_post(post_id, caller)?))
        } else {
            self.like_post(post_id, caller)
        }
    }

    pub fn like_status(&self, post_id: usize, viewer: Option<usize>) -> ServiceResult<LikeStatus> {
        self.require_post(post_id)?;
        let liked = match viewer {
            Some(viewer) => self.store.is_liked(post_id, viewer)?,
            None => false,
        };
        Ok(LikeStatus {
            count: self.store.count_likes(post_id)?,
            liked,
        })
    }

    pub fn likes_count(&self, post_id: usize) -> ServiceResult<usize> {
        Ok(self.like_status(post_id, None)?.count)
    }

    pub fn is_liked(&self, post_id: usize, user_id: usize) -> ServiceResult<bool> {
        Ok(self.like_status(post_id, Some(user_id))?.liked)
    }
}
