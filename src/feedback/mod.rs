//! Rated feedback left by users.

mod feedback_manager;
mod feedback_store;
mod models;
mod sqlite_feedback_store;

pub use feedback_manager::FeedbackManager;
pub use feedback_store::FeedbackStore;
pub use models::{Feedback, FeedbackDraft, FeedbackView, MAX_RATING, MIN_RATING};
