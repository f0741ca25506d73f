use crate::media::MediaType;
use crate::user::UserSummary;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    SkillSharing,
    LearningProgress,
    LearningPlan,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::SkillSharing => "skill_sharing",
            PostType::LearningProgress => "learning_progress",
            PostType::LearningPlan => "learning_plan",
        }
    }
}

impl FromStr for PostType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "skill_sharing" => Ok(PostType::SkillSharing),
            "learning_progress" => Ok(PostType::LearningProgress),
            "learning_plan" => Ok(PostType::LearningPlan),
            _ => bail!("Unknown post type {}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostMedia {
    pub id: usize,
    pub media_type: MediaType,
    pub url: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: usize,
    pub user_id: usize,
    pub content: String,
    pub post_type: PostType,
    pub media: Vec<PostMedia>,
    pub created: i64,
    pub updated: Option<i64>,
}

impl Post {
    pub fn media_urls(&self) -> impl Iterator<Item = &str> {
        self.media.iter().map(|m| m.url.as_str())
    }
}

/// Client-provided part of a post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    pub content: String,
    #[serde(default)]
    pub post_type: PostType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: usize,
    pub post_id: usize,
    pub user_id: usize,
    pub content: String,
    pub created: i64,
    pub updated: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeStatus {
    pub count: usize,
    pub liked: bool,
}
