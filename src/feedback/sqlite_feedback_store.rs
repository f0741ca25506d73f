use super::feedback_store::FeedbackStore;
use super::models::Feedback;
use crate::store::{row_id, SqlitePlatformStore};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

const FEEDBACK_COLUMNS: &str = "id, user_id, title, content, rating, created, updated";

fn feedback_from_row(row: &Row) -> rusqlite::Result<Feedback> {
    Ok(Feedback {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        rating: row.get(4)?,
        created: row.get(5)?,
        updated: row.get(6)?,
    })
}

impl FeedbackStore for SqlitePlatformStore {
    fn insert_feedback(
        &self,
        user_id: usize,
        title: &str,
        content: &str,
        rating: u8,
        created: i64,
    ) -> Result<Feedback> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO feedback (user_id, title, content, rating, created) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, title, content, rating, created],
        )
        .with_context(|| format!("Failed to insert feedback for user {}", user_id))?;
        Ok(Feedback {
            id: conn.last_insert_rowid() as usize,
            user_id,
            title: title.to_string(),
            content: content.to_string(),
            rating,
            created,
            updated: None,
        })
    }

    fn get_feedback(&self, feedback_id: usize) -> Result<Option<Feedback>> {
        let Some(feedback_id) = row_id(feedback_id) else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM feedback WHERE id = ?1", FEEDBACK_COLUMNS),
                params![feedback_id],
                feedback_from_row,
            )
            .optional()?)
    }

    fn update_feedback(
        &self,
        feedback_id: usize,
        title: &str,
        content: &str,
        rating: u8,
        updated: i64,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE feedback SET title = ?1, content = ?2, rating = ?3, updated = ?4 WHERE id = ?5",
            params![title, content, rating, updated, feedback_id],
        )?;
        Ok(changed > 0)
    }

    fn delete_feedback(&self, feedback_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM feedback WHERE id = ?1", params![feedback_id])?;
        Ok(deleted > 0)
    }

    fn list_feedback(&self) -> Result<Vec<Feedback>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM feedback ORDER BY created DESC, id DESC",
            FEEDBACK_COLUMNS
        ))?;
        let items = stmt
            .query_map([], feedback_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn list_user_feedback(&self, user_id: usize) -> Result<Vec<Feedback>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM feedback WHERE user_id = ?1 ORDER BY created DESC, id DESC",
            FEEDBACK_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![user_id], feedback_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}
