//! Specific background job implementations.

pub mod story_expiry;

pub use story_expiry::StoryExpiryJob;
