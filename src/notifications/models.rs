//! Notification data models

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Notification type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Like,
    Comment,
    Follow,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Like => "like",
            NotificationType::Comment => "comment",
            NotificationType::Follow => "follow",
        }
    }
}

impl FromStr for NotificationType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "like" => Ok(NotificationType::Like),
            "comment" => Ok(NotificationType::Comment),
            "follow" => Ok(NotificationType::Follow),
            _ => bail!("Unknown notification type {}", s),
        }
    }
}

/// A user notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: usize,
    pub user_id: usize,
    pub message: String,
    pub notification_type: NotificationType,
    /// Post id for likes and comments, actor id for follows.
    pub reference_id: Option<usize>,
    pub is_read: bool,
    pub created: i64,
}
