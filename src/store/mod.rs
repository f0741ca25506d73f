//! The single relational store backing every domain module.
//!
//! `SqlitePlatformStore` owns one SQLite connection; each domain module
//! implements its own store trait for it next to the trait definition.

mod pagination;
pub mod schema;

pub use pagination::{Page, Paged, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::content::ContentStore;
use crate::feedback::FeedbackStore;
use crate::learning_plans::LearningPlanStore;
use crate::notifications::NotificationStore;
use crate::social_graph::GraphStore;
use crate::sqlite_persistence::{read_schema_version, BASE_DB_VERSION};
use crate::stories::StoryStore;
use crate::user::UserStore;
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use schema::VERSIONED_SCHEMAS;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Every store trait, implemented by one backend.
pub trait PlatformStore:
    UserStore
    + GraphStore
    + ContentStore
    + StoryStore
    + NotificationStore
    + LearningPlanStore
    + FeedbackStore
    + Send
    + Sync
{
}

impl<T> PlatformStore for T where
    T: UserStore
        + GraphStore
        + ContentStore
        + StoryStore
        + NotificationStore
        + LearningPlanStore
        + FeedbackStore
        + Send
        + Sync
{
}

/// Current time as unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// SQLite row ids are signed 64-bit; anything larger cannot name a row.
pub(crate) fn row_id(id: usize) -> Option<i64> {
    i64::try_from(id).ok()
}

/// Reads a text column holding one of our enum values.
pub(crate) fn parse_text_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    let value: String = row.get(idx)?;
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

#[derive(Clone)]
pub struct SqlitePlatformStore {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl SqlitePlatformStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(db_path)?;
            VERSIONED_SCHEMAS
                .last()
                .context("No schema defined")?
                .create(&conn)?;
            conn
        };
        Self::from_connection(conn)
    }

    /// In-memory database with the latest schema.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        VERSIONED_SCHEMAS
            .last()
            .context("No schema defined")?
            .create(&conn)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Foreign key enforcement is per connection, cascades depend on it
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version = read_schema_version(&conn)?;
        if version >= VERSIONED_SCHEMAS.len() {
            bail!("Database version {} is too new", version);
        }
        VERSIONED_SCHEMAS
            .get(version)
            .context("Failed to get schema")?
            .validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqlitePlatformStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;

        Ok(())
    }
}
