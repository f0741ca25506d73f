//! Posts with their media attachments, comments and likes.

mod content_manager;
mod content_store;
mod models;
mod sqlite_content_store;

pub use content_manager::{ContentManager, MAX_ATTACHMENTS};
pub use content_store::ContentStore;
pub use models::{Comment, CommentView, LikeStatus, Post, PostDraft, PostMedia, PostType};
