use super::models::{LearningPlan, LearningPlanDraft};
use crate::store::{Page, Paged};
use anyhow::Result;

/// Learning plans and their ordered topics. The draft passed in is already
/// validated and normalized.
pub trait LearningPlanStore: Send + Sync {
    /// Inserts the plan and its topics atomically.
    fn insert_plan(
        &self,
        user_id: usize,
        draft: &LearningPlanDraft,
        progress: u8,
        created: i64,
    ) -> Result<LearningPlan>;

    fn get_plan(&self, plan_id: usize) -> Result<Option<LearningPlan>>;

    /// Replaces the plan fields and all of its topics atomically.
    /// Returns false if the plan does not exist.
    fn replace_plan(
        &self,
        plan_id: usize,
        draft: &LearningPlanDraft,
        progress: u8,
        updated: i64,
    ) -> Result<bool>;

    /// Marks one topic and recomputes the plan progress atomically.
    /// Returns None if the topic does not belong to the plan.
    fn set_topic_completed(
        &self,
        plan_id: usize,
        topic_id: usize,
        completed: bool,
        updated: i64,
    ) -> Result<Option<LearningPlan>>;

    /// Returns false if the plan does not exist.
    fn delete_plan(&self, plan_id: usize) -> Result<bool>;

    fn list_user_plans(&self, user_id: usize) -> Result<Vec<LearningPlan>>;

    fn list_plans(&self, page: Page) -> Result<Paged<LearningPlan>>;

    /// Case-insensitive substring match on the title.
    fn search_plans(&self, query: &str, page: Page) -> Result<Paged<LearningPlan>>;
}
