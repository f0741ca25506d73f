use crate::media::MediaType;
use serde::Serialize;

/// How long a story stays visible after creation.
pub const STORY_LIFETIME_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub id: usize,
    pub user_id: usize,
    pub content: Option<String>,
    pub media_url: String,
    pub media_type: MediaType,
    pub created: i64,
    pub expires_at: i64,
}

impl Story {
    /// Active until `expires_at`, expired from then on until swept.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.expires_at > now
    }
}
