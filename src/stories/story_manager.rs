use super::models::{Story, STORY_LIFETIME_SECS};
use crate::error::{ServiceError, ServiceResult};
use crate::feed::{decorate_stories, decorate_story, DecoratedStory};
use crate::media::{MediaStorage, MediaUpload};
use crate::outcome::Outcome;
use crate::store::{unix_now, Page, Paged, PlatformStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one expiry sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub purged: usize,
    pub media_failures: usize,
}

pub struct StoryManager {
    store: Arc<dyn PlatformStore>,
    media: Arc<MediaStorage>,
}

impl StoryManager {
    pub fn new(store: Arc<dyn PlatformStore>, media: Arc<MediaStorage>) -> Self {
        Self { store, media }
    }

    fn require_active(&self, story_id: usize, now: i64) -> ServiceResult<Story> {
        self.store
            .get_story(story_id)?
            .filter(|story| story.is_active_at(now))
            .ok_or_else(|| ServiceError::not_found("Story", story_id))
    }

    pub async fn create_story(
        &self,
        owner: usize,
        content: Option<String>,
        upload: MediaUpload,
    ) -> ServiceResult<DecoratedStory> {
        self.create_story_at(owner, content, upload, unix_now())
            .await
    }

    /// Stores the media and publishes a story expiring 24h after `now`.
    pub async fn create_story_at(
        &self,
        owner: usize,
        content: Option<String>,
        upload: MediaUpload,
        now: i64,
    ) -> ServiceResult<DecoratedStory> {
        let content = content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.media.validate(&upload)?;
        let stored = self.media.store(&upload).await?;

        let inserted = self.store.insert_story(
            owner,
            content.as_deref(),
            &stored,
            now,
            now + STORY_LIFETIME_SECS,
        );
        let story = match inserted {
            Ok(story) => story,
            Err(err) => {
                if let Err(failure) = self.media.delete_best_effort(&stored.url).await {
                    warn!(
                        "Story insert for user {} failed, {} was left behind: {}",
                        owner, stored.url, failure.reason
                    );
                }
                return Err(err.into());
            }
        };
        info!("User {} published story {}", owner, story.id);
        Ok(decorate_story(self.store.as_ref(), story, Some(owner))?)
    }

    pub fn view_story(&self, story_id: usize, viewer: usize) -> ServiceResult<bool> {
        self.view_story_at(story_id, viewer, unix_now())
    }

    /// Records a view. Expired stories are not found. Returns whether the view is new.
    pub fn view_story_at(&self, story_id: usize, viewer: usize, now: i64) -> ServiceResult<bool> {
        self.require_active(story_id, now)?;
        Ok(self.store.add_story_view(story_id, viewer)?)
    }

    /// Removes the story, then its media file best-effort.
    pub async fn delete_story(&self, story_id: usize, caller: usize) -> ServiceResult<Outcome<()>> {
        let story = self
            .store
            .get_story(story_id)?
            .ok_or_else(|| ServiceError::not_found("Story", story_id))?;
        if story.user_id != caller {
            return Err(ServiceError::NotAuthorized(
                "You can only delete your own stories".to_string(),
            ));
        }

        let mut outcome = Outcome::new(());
        if let Some(deleted) = self.store.delete_story(story_id)? {
            outcome.absorb(self.media.delete_best_effort(&deleted.media_url).await);
        }
        Ok(outcome)
    }

    pub fn list_active_stories(
        &self,
        page: Page,
        viewer: Option<usize>,
    ) -> ServiceResult<Paged<DecoratedStory>> {
        self.list_active_stories_at(page, viewer, unix_now())
    }

    pub fn list_active_stories_at(
        &self,
        page: Page,
        viewer: Option<usize>,
        now: i64,
    ) -> ServiceResult<Paged<DecoratedStory>> {
        let stories = self.store.list_active_stories(now, page)?;
        let store = self.store.as_ref();
        Ok(stories.try_map(|story| decorate_story(store, story, viewer))?)
    }

    pub fn list_user_stories(
        &self,
        user_id: usize,
        viewer: Option<usize>,
    ) -> ServiceResult<Vec<DecoratedStory>> {
        self.list_user_stories_at(user_id, viewer, unix_now())
    }

    pub fn list_user_stories_at(
        &self,
        user_id: usize,
        viewer: Option<usize>,
        now: i64,
    ) -> ServiceResult<Vec<DecoratedStory>> {
        if self.store.get_user(user_id)?.is_none() {
            return Err(ServiceError::not_found("User", user_id));
        }
        let stories = self.store.list_user_active_stories(user_id, now)?;
        Ok(decorate_stories(self.store.as_ref(), stories, viewer)?)
    }

    /// Deletes every story expired as of `now`, then their media files.
    /// A file that cannot be removed is logged and counted, the records stay purged.
    pub async fn purge_expired(&self, now: i64) -> anyhow::Result<PurgeReport> {
        let purged = self.store.purge_expired_stories(now)?;
        if purged.is_empty() {
            debug!("No expired stories to purge");
            return Ok(PurgeReport::default());
        }
        let urls: Vec<&str> = purged.iter().map(|story| story.media_url.as_str()).collect();
        let failures = self.media.delete_all_best_effort(&urls).await;
        info!(
            "Purged {} expired stories ({} media files left behind)",
            purged.len(),
            failures.len()
        );
        Ok(PurgeReport {
            purged: purged.len(),
            media_failures: failures.len(),
        })
    }
}
