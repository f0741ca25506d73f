use super::models::{
    compute_progress, format_plan_date, parse_plan_date, LearningPlan, LearningPlanDraft,
};
use crate::error::{FieldErrors, ServiceError, ServiceResult};
use crate::store::{unix_now, Page, Paged, PlatformStore};
use std::sync::Arc;
use tracing::info;

pub struct LearningPlanManager {
    store: Arc<dyn PlatformStore>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Checks the draft and returns it trimmed, with dates in one format.
fn normalize(draft: LearningPlanDraft) -> ServiceResult<LearningPlanDraft> {
    let start = draft.start_date.as_deref().map(parse_plan_date);
    let end = draft.end_date.as_deref().map(parse_plan_date);

    let mut errors = FieldErrors::new();
    errors
        .check(!draft.title.trim().is_empty(), "title", "Title is required")
        .check(
            !matches!(start, Some(None)),
            "start_date",
            "Start date must be YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
        )
        .check(
            !matches!(end, Some(None)),
            "end_date",
            "End date must be YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
        );
    if let (Some(Some(start)), Some(Some(end))) = (start, end) {
        errors.check(end >= start, "end_date", "End date must not be before start date");
    }
    for (i, topic) in draft.topics.iter().enumerate() {
        errors.check(
            !topic.name.trim().is_empty(),
            &format!("topics[{}].name", i),
            "Topic name is required",
        );
    }
    errors.into_result()?;

    let mut draft = draft;
    draft.title = draft.title.trim().to_string();
    draft.description = non_blank(draft.description);
    draft.start_date = start.flatten().map(|d| format_plan_date(&d));
    draft.end_date = end.flatten().map(|d| format_plan_date(&d));
    for topic in draft.topics.iter_mut() {
        topic.name = topic.name.trim().to_string();
        topic.description = non_blank(topic.description.take());
        topic.resources = non_blank(topic.resources.take());
    }
    Ok(draft)
}

impl LearningPlanManager {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    fn require_owned(&self, plan_id: usize, caller: usize) -> ServiceResult<LearningPlan> {
        let plan = self.get_plan(plan_id)?;
        if plan.user_id != caller {
            return Err(ServiceError::NotAuthorized(
                "You can only modify your own learning plans".to_string(),
            ));
        }
        Ok(plan)
    }

    pub fn create_plan(&self, owner: usize, draft: LearningPlanDraft) -> ServiceResult<LearningPlan> {
        let draft = normalize(draft)?;
        let progress = compute_progress(draft.completed_topics(), draft.topics.len());
        let plan = self
            .store
            .insert_plan(owner, &draft, progress, unix_now())?;
        info!(
            "User {} created learning plan {} with {} topics",
            owner,
            plan.id,
            plan.topics.len()
        );
        Ok(plan)
    }

    /// Replaces the plan and every one of its topics.
    pub fn update_plan(
        &self,
        plan_id: usize,
        caller: usize,
        draft: LearningPlanDraft,
    ) -> ServiceResult<LearningPlan> {
        self.require_owned(plan_id, caller)?;
        let draft = normalize(draft)?;
        let progress = compute_progress(draft.completed_topics(), draft.topics.len());
        if !self
            .store
            .replace_plan(plan_id, &draft, progress, unix_now())?
        {
            return Err(ServiceError::not_found("Learning plan", plan_id));
        }
        self.get_plan(plan_id)
    }

    pub fn set_topic_completed(
        &self,
        plan_id: usize,
        topic_id: usize,
        caller: usize,
        completed: bool,
    ) -> ServiceResult<LearningPlan> {
        self.require_owned(plan_id, caller)?;
        self.store
            .set_topic_completed(plan_id, topic_id, completed, unix_now())?
            .ok_or_else(|| ServiceError::not_found("Topic", topic_id))
    }

    pub fn delete_plan(&self, plan_id: usize, caller: usize) -> ServiceResult<()> {
        self.require_owned(plan_id, caller)?;
        self.store.delete_plan(plan_id)?;
        info!("User {} deleted learning plan {}", caller, plan_id);
        Ok(())
    }

    pub fn get_plan(&self, plan_id: usize) -> ServiceResult<LearningPlan> {
        self.store
            .get_plan(plan_id)?
            .ok_or_else(|| ServiceError::not_found("Learning plan", plan_id))
    }

    pub fn list_user_plans(&self, user_id: usize) -> ServiceResult<Vec<LearningPlan>> {
        if self.store.get_user(user_id)?.is_none() {
            return Err(ServiceError::not_found("User", user_id));
        }
        Ok(self.store.list_user_plans(user_id)?)
    }

    pub fn list_plans(&self, page: Page) -> ServiceResult<Paged<LearningPlan>> {
        Ok(self.store.list_plans(page)?)
    }

    pub fn search_plans(&self, query: &str, page: Page) -> ServiceResult<Paged<LearningPlan>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Paged::new(vec![], page, 0));
        }
        Ok(self.store.search_plans(query, page)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::learning_plans::TopicDraft;
    use crate::store::SqlitePlatformStore;
    use crate::user::{NewUser, UserStore};

    fn setup() -> (LearningPlanManager, usize, usize) {
        let store = Arc::new(SqlitePlatformStore::in_memory().unwrap());
        let mut ids = vec![];
        for name in ["owner", "other"] {
            ids.push(
                store
                    .create_user(&NewUser {
                        username: name.to_string(),
                        email: format!("{}@example.com", name),
                        password_hash: "hash".to_string(),
                        name: name.to_string(),
                    })
                    .unwrap(),
            );
        }
        (LearningPlanManager::new(store), ids[0], ids[1])
    }

    fn topic(name: &str, completed: bool) -> TopicDraft {
        TopicDraft {
            name: name.to_string(),
            description: Some("  ".to_string()),
            resources: None,
            completed,
        }
    }

    fn draft(topics: Vec<TopicDraft>) -> LearningPlanDraft {
        LearningPlanDraft {
            title: " Learn Rust ".to_string(),
            description: None,
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-06-30T12:00:00".to_string()),
            topics,
        }
    }

    #[test]
    fn progress_follows_topics() {
        let (plans, owner, _) = setup();
        let plan = plans.create_plan(owner, draft(vec![])).unwrap();
        assert_eq!(plan.progress, 0);
        assert_eq!(plan.title, "Learn Rust");
        assert_eq!(plan.start_date.as_deref(), Some("2024-01-01T00:00:00"));

        let plan = plans
            .update_plan(
                plan.id,
                owner,
                draft(vec![
                    topic("ownership", true),
                    topic("borrowing", true),
                    topic("lifetimes", false),
                    topic("traits", false),
                ]),
            )
            .unwrap();
        assert_eq!(plan.progress, 50);
        assert_eq!(plan.topics[0].description, None);

        let plan = plans
            .set_topic_completed(plan.id, plan.topics[2].id, owner, true)
            .unwrap();
        assert_eq!(plan.progress, 75);
    }

    #[test]
    fn invalid_draft_reports_fields() {
        let (plans, owner, _) = setup();
        let err = plans
            .create_plan(
                owner,
                LearningPlanDraft {
                    title: " ".to_string(),
                    description: None,
                    start_date: Some("2024-06-01".to_string()),
                    end_date: Some("2024-01-01".to_string()),
                    topics: vec![topic("", false)],
                },
            )
            .unwrap_err();
        let fields = err.fields().unwrap();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("end_date"));
        assert!(fields.contains_key("topics[0].name"));

        let mut bad_date = draft(vec![]);
        bad_date.start_date = Some("soon".to_string());
        let err = plans.create_plan(owner, bad_date).unwrap_err();
        assert!(err.fields().unwrap().contains_key("start_date"));
    }

    #[test]
    fn only_owner_modifies() {
        let (plans, owner, other) = setup();
        let plan = plans
            .create_plan(owner, draft(vec![topic("a", false)]))
            .unwrap();

        let err = plans.update_plan(plan.id, other, draft(vec![])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
        let err = plans
            .set_topic_completed(plan.id, plan.topics[0].id, other, true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
        let err = plans.delete_plan(plan.id, other).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);

        plans.delete_plan(plan.id, owner).unwrap();
        assert_eq!(plans.get_plan(plan.id).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unknown_topic_is_not_found() {
        let (plans, owner, _) = setup();
        let plan = plans.create_plan(owner, draft(vec![])).unwrap();
        let err = plans
            .set_topic_completed(plan.id, 4242, owner, true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn lists_and_searches() {
        let (plans, owner, other) = setup();
        plans.create_plan(owner, draft(vec![])).unwrap();

        assert_eq!(plans.list_user_plans(owner).unwrap().len(), 1);
        assert!(plans.list_user_plans(other).unwrap().is_empty());
        assert_eq!(
            plans.list_user_plans(9999).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(plans.list_plans(Page::default()).unwrap().total, 1);
        assert_eq!(
            plans.search_plans("RUST", Page::default()).unwrap().total,
            1
        );
        assert_eq!(plans.search_plans("", Page::default()).unwrap().total, 0);
    }
}
