//! Ephemeral stories: visible for 24 hours, swept afterwards.

mod models;
mod sqlite_story_store;
mod story_manager;
mod story_store;

pub use models::{Story, STORY_LIFETIME_SECS};
pub use story_manager::{PurgeReport, StoryManager};
pub use story_store::StoryStore;
