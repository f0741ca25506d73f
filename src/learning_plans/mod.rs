//! Learning plans with ordered topics and derived progress.

mod models;
mod plan_manager;
mod plan_store;
mod sqlite_plan_store;

pub use models::{
    compute_progress, LearningPlan, LearningPlanDraft, LearningPlanTopic, TopicDraft,
};
pub use plan_manager::LearningPlanManager;
pub use plan_store::LearningPlanStore;
