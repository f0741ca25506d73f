use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningPlanTopic {
    pub id: usize,
    pub name: String,
    pub description: Option<String>,
    pub resources: Option<String>,
    pub position: usize,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningPlan {
    pub id: usize,
    pub user_id: usize,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub progress: u8,
    pub topics: Vec<LearningPlanTopic>,
    pub created: i64,
    pub updated: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicDraft {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Client-provided plan. Topics keep the order they are given in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LearningPlanDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub topics: Vec<TopicDraft>,
}

impl LearningPlanDraft {
    pub fn completed_topics(&self) -> usize {
        self.topics.iter().filter(|t| t.completed).count()
    }
}

/// Percentage of completed topics, rounded down. A plan without topics is at 0.
pub fn compute_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (completed.min(total) * 100 / total) as u8
}

/// Accepts `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS[.fff]`.
pub(crate) fn parse_plan_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date_time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date_time);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub(crate) fn format_plan_date(date_time: &NaiveDateTime) -> String {
    date_time.format(DATE_TIME_FORMAT).to_string()
}
