use super::decorate::{decorate_posts, decorate_stories, DecoratedPost, DecoratedStory};
use crate::error::ServiceResult;
use crate::store::{unix_now, Page, Paged, PlatformStore};
use std::sync::Arc;
use tracing::debug;

/// Builds a viewer's home feeds from the users they follow.
pub struct FeedAssembler {
    store: Arc<dyn PlatformStore>,
}

impl FeedAssembler {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    /// Posts by followed users, newest first.
    pub fn assemble_feed(&self, viewer: usize, page: Page) -> ServiceResult<Paged<DecoratedPost>> {
        let posts = self.store.list_followed_posts(viewer, page)?;
        debug!(
            "Feed page {} for user {}: {} of {} posts",
            page.page,
            viewer,
            posts.items.len(),
            posts.total
        );
        Ok(decorate_posts(self.store.as_ref(), posts, Some(viewer))?)
    }

    pub fn assemble_story_feed(&self, viewer: usize) -> ServiceResult<Vec<DecoratedStory>> {
        self.assemble_story_feed_at(viewer, unix_now())
    }

    /// Active stories by followed users as of `now`, newest first.
    pub fn assemble_story_feed_at(
        &self,
        viewer: usize,
        now: i64,
    ) -> ServiceResult<Vec<DecoratedStory>> {
        let stories = self.store.list_followed_active_stories(viewer, now)?;
        Ok(decorate_stories(self.store.as_ref(), stories, Some(viewer))?)
    }
}
