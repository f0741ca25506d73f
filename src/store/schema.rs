//! Table definitions for the platform database, one constant per table version.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const POST_FK: ForeignKey = ForeignKey {
    foreign_table: "post",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const STORY_FK: ForeignKey = ForeignKey {
    foreign_table: "story",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const LEARNING_PLAN_FK: ForeignKey = ForeignKey {
    foreign_table: "learning_plan",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// V 0
pub const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("username", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("password_hash", &SqlType::Text, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("bio", &SqlType::Text),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("avatar_url", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

pub const FOLLOW_TABLE_V_0: Table = Table {
    name: "follow",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "follower_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "followed_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_follow_followed", "followed_id")],
    unique_constraints: &[&["follower_id", "followed_id"]],
};

pub const POST_TABLE_V_0: Table = Table {
    name: "post",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("content", &SqlType::Text, non_null = true),
        sqlite_column!("post_type", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated", &SqlType::Integer),
    ],
    indices: &[
        ("idx_post_user", "user_id"),
        ("idx_post_created", "created"),
    ],
    unique_constraints: &[],
};

pub const POST_MEDIA_TABLE_V_0: Table = Table {
    name: "post_media",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "post_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&POST_FK)
        ),
        sqlite_column!("media_type", &SqlType::Text, non_null = true),
        sqlite_column!("url", &SqlType::Text, non_null = true),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_post_media_post", "post_id")],
    unique_constraints: &[],
};

pub const COMMENT_TABLE_V_0: Table = Table {
    name: "comment",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "post_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&POST_FK)
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("content", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated", &SqlType::Integer),
    ],
    indices: &[("idx_comment_post", "post_id")],
    unique_constraints: &[],
};

pub const POST_LIKE_TABLE_V_0: Table = Table {
    name: "post_like",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "post_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&POST_FK)
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_post_like_post", "post_id")],
    unique_constraints: &[&["user_id", "post_id"]],
};

pub const NOTIFICATION_TABLE_V_0: Table = Table {
    name: "notification",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("message", &SqlType::Text, non_null = true),
        sqlite_column!("notification_type", &SqlType::Text, non_null = true),
        sqlite_column!("reference_id", &SqlType::Integer),
        sqlite_column!(
            "is_read",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_notification_user", "user_id")],
    unique_constraints: &[],
};

/// V 1
pub const STORY_TABLE_V_0: Table = Table {
    name: "story",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("content", &SqlType::Text),
        sqlite_column!("media_url", &SqlType::Text, non_null = true),
        sqlite_column!("media_type", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("expires_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_story_user", "user_id"),
        ("idx_story_expires_at", "expires_at"),
    ],
    unique_constraints: &[],
};

pub const STORY_VIEW_TABLE_V_0: Table = Table {
    name: "story_view",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "story_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&STORY_FK)
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["story_id", "user_id"]],
};

/// V 2
pub const LEARNING_PLAN_TABLE_V_0: Table = Table {
    name: "learning_plan",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("start_date", &SqlType::Text),
        sqlite_column!("end_date", &SqlType::Text),
        sqlite_column!(
            "progress",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated", &SqlType::Integer),
    ],
    indices: &[("idx_learning_plan_user", "user_id")],
    unique_constraints: &[],
};

pub const LEARNING_PLAN_TOPIC_TABLE_V_0: Table = Table {
    name: "learning_plan_topic",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "plan_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&LEARNING_PLAN_FK)
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("resources", &SqlType::Text),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "completed",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[("idx_learning_plan_topic_plan", "plan_id")],
    unique_constraints: &[],
};

pub const FEEDBACK_TABLE_V_0: Table = Table {
    name: "feedback",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("content", &SqlType::Text, non_null = true),
        sqlite_column!("rating", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated", &SqlType::Integer),
    ],
    indices: &[("idx_feedback_user", "user_id")],
    unique_constraints: &[],
};

/// New tables or columns go in as a new version with a migration from the previous one.
pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        FOLLOW_TABLE_V_0,
        POST_TABLE_V_0,
        POST_MEDIA_TABLE_V_0,
        COMMENT_TABLE_V_0,
        POST_LIKE_TABLE_V_0,
        STORY_TABLE_V_0,
        STORY_VIEW_TABLE_V_0,
        NOTIFICATION_TABLE_V_0,
        LEARNING_PLAN_TABLE_V_0,
        LEARNING_PLAN_TOPIC_TABLE_V_0,
        FEEDBACK_TABLE_V_0,
    ],
    migration: None,
}];
