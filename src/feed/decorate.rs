use crate::content::Post;
use crate::store::{Paged, PlatformStore};
use crate::stories::Story;
use crate::user::UserSummary;
use anyhow::{Context, Result};
use serde::Serialize;

/// A post as shown to a viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedPost {
    #[serde(flatten)]
    pub post: Post,
    pub author: UserSummary,
    pub likes_count: usize,
    pub comments_count: usize,
    pub is_liked_by_viewer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedStory {
    #[serde(flatten)]
    pub story: Story,
    pub author: UserSummary,
    pub views_count: usize,
    pub viewed_by_viewer: bool,
}

fn author_summary(store: &dyn PlatformStore, user_id: usize) -> Result<UserSummary> {
    let user = store
        .get_user(user_id)?
        .with_context(|| format!("Author {} is missing", user_id))?;
    Ok(UserSummary::from(&user))
}

pub fn decorate_post(
    store: &dyn PlatformStore,
    post: Post,
    viewer: Option<usize>,
) -> Result<DecoratedPost> {
    let is_liked_by_viewer = match viewer {
        Some(viewer) => store.is_liked(post.id, viewer)?,
        None => false,
    };
    Ok(DecoratedPost {
        author: author_summary(store, post.user_id)?,
        likes_count: store.count_likes(post.id)?,
        comments_count: store.count_comments(post.id)?,
        is_liked_by_viewer,
        post,
    })
}

pub fn decorate_posts(
    store: &dyn PlatformStore,
    posts: Paged<Post>,
    viewer: Option<usize>,
) -> Result<Paged<DecoratedPost>> {
    posts.try_map(|post| decorate_post(store, post, viewer))
}

pub fn decorate_story(
    store: &dyn PlatformStore,
    story: Story,
    viewer: Option<usize>,
) -> Result<DecoratedStory> {
    let viewed_by_viewer = match viewer {
        Some(viewer) => store.has_viewed_story(story.id, viewer)?,
        None => false,
    };
    Ok(DecoratedStory {
        author: author_summary(store, story.user_id)?,
        views_count: store.count_story_views(story.id)?,
        viewed_by_viewer,
        story,
    })
}

pub fn decorate_stories(
    store: &dyn PlatformStore,
    stories: Vec<Story>,
    viewer: Option<usize>,
) -> Result<Vec<DecoratedStory>> {
    stories
        .into_iter()
        .map(|story| decorate_story(store, story, viewer))
        .collect()
}
