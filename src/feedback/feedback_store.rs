use super::models::Feedback;
use anyhow::Result;

pub trait FeedbackStore: Send + Sync {
    fn insert_feedback(
        &self,
        user_id: usize,
        title: &str,
        content: &str,
        rating: u8,
        created: i64,
    ) -> Result<Feedback>;

    fn get_feedback(&self, feedback_id: usize) -> Result<Option<Feedback>>;

    /// Returns false if the feedback does not exist.
    fn update_feedback(
        &self,
        feedback_id: usize,
        title: &str,
        content: &str,
        rating: u8,
        updated: i64,
    ) -> Result<bool>;

    /// Returns false if the feedback does not exist.
    fn delete_feedback(&self, feedback_id: usize) -> Result<bool>;

    /// Newest first.
    fn list_feedback(&self) -> Result<Vec<Feedback>>;

    /// Newest first.
    fn list_user_feedback(&self, user_id: usize) -> Result<Vec<Feedback>>;
}
