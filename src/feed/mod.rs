//! Viewer-facing listings: follow-filtered feeds and the decoration shared
//! with global and profile listings.

mod decorate;
mod feed_assembler;

pub use decorate::{
    decorate_post, decorate_posts, decorate_stories, decorate_story, DecoratedPost,
    DecoratedStory,
};
pub use feed_assembler::FeedAssembler;
