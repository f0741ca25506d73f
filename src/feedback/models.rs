use crate::user::UserSummary;
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub id: usize,
    pub user_id: usize,
    pub title: String,
    pub content: String,
    pub rating: u8,
    pub created: i64,
    pub updated: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackView {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub author: UserSummary,
}

/// Out-of-range ratings are kept as sent so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedbackDraft {
    pub title: String,
    pub content: String,
    pub rating: i64,
}
