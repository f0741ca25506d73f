use super::models::{Feedback, FeedbackDraft, FeedbackView, MAX_RATING, MIN_RATING};
use crate::error::{FieldErrors, ServiceError, ServiceResult};
use crate::store::{unix_now, PlatformStore};
use crate::user::UserSummary;
use std::sync::Arc;
use tracing::debug;

pub struct FeedbackManager {
    store: Arc<dyn PlatformStore>,
}

struct ValidFeedback {
    title: String,
    content: String,
    rating: u8,
}

fn validate(draft: &FeedbackDraft) -> ServiceResult<ValidFeedback> {
    let title = draft.title.trim();
    let content = draft.content.trim();
    let rating_range = i64::from(MIN_RATING)..=i64::from(MAX_RATING);

    let mut errors = FieldErrors::new();
    errors
        .check(!title.is_empty(), "title", "Title is required")
        .check(!content.is_empty(), "content", "Content is required")
        .check(
            rating_range.contains(&draft.rating),
            "rating",
            "Rating must be between 1 and 5",
        );
    errors.into_result()?;

    Ok(ValidFeedback {
        title: title.to_string(),
        content: content.to_string(),
        rating: draft.rating as u8,
    })
}

impl FeedbackManager {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    fn view(&self, feedback: Feedback) -> ServiceResult<FeedbackView> {
        let author = self
            .store
            .get_user(feedback.user_id)?
            .ok_or_else(|| ServiceError::not_found("User", feedback.user_id))?;
        Ok(FeedbackView {
            author: UserSummary::from(&author),
            feedback,
        })
    }

    fn require_owned(&self, feedback_id: usize, caller: usize, action: &str) -> ServiceResult<()> {
        let feedback = self
            .store
            .get_feedback(feedback_id)?
            .ok_or_else(|| ServiceError::not_found("Feedback", feedback_id))?;
        if feedback.user_id != caller {
            return Err(ServiceError::NotAuthorized(format!(
                "You can only {} your own feedback",
                action
            )));
        }
        Ok(())
    }

    pub fn create(&self, owner: usize, draft: FeedbackDraft) -> ServiceResult<FeedbackView> {
        let valid = validate(&draft)?;
        let feedback = self.store.insert_feedback(
            owner,
            &valid.title,
            &valid.content,
            valid.rating,
            unix_now(),
        )?;
        debug!("User {} left feedback {}", owner, feedback.id);
        self.view(feedback)
    }

    pub fn update(
        &self,
        feedback_id: usize,
        caller: usize,
        draft: FeedbackDraft,
    ) -> ServiceResult<FeedbackView> {
        self.require_owned(feedback_id, caller, "update")?;
        let valid = validate(&draft)?;
        if !self.store.update_feedback(
            feedback_id,
            &valid.title,
            &valid.content,
            valid.rating,
            unix_now(),
        )? {
            return Err(ServiceError::not_found("Feedback", feedback_id));
        }
        self.get(feedback_id)
    }

    pub fn delete(&self, feedback_id: usize, caller: usize) -> ServiceResult<()> {
        self.require_owned(feedback_id, caller, "delete")?;
        self.store.delete_feedback(feedback_id)?;
        Ok(())
    }

    pub fn get(&self, feedback_id: usize) -> ServiceResult<FeedbackView> {
        let feedback = self
            .store
            .get_feedback(feedback_id)?
            .ok_or_else(|| ServiceError::not_found("Feedback", feedback_id))?;
        self.view(feedback)
    }

    pub fn list_all(&self) -> ServiceResult<Vec<FeedbackView>> {
        self.store
            .list_feedback()?
            .into_iter()
            .map(|feedback| self.view(feedback))
            .collect()
    }

    pub fn list_by_user(&self, user_id: usize) -> ServiceResult<Vec<FeedbackView>> {
        self.store
            .list_user_feedback(user_id)?
            .into_iter()
            .map(|feedback| self.view(feedback))
            .collect()
    }
}
