use super::models::Story;
use super::story_store::StoryStore;
use crate::media::StoredMedia;
use crate::store::{parse_text_column, row_id, Page, Paged, SqlitePlatformStore};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

const STORY_COLUMNS: &str = "id, user_id, content, media_url, media_type, created, expires_at";

fn story_from_row(row: &Row) -> rusqlite::Result<Story> {
    Ok(Story {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content: row.get(2)?,
        media_url: row.get(3)?,
        media_type: parse_text_column(row, 4)?,
        created: row.get(5)?,
        expires_at: row.get(6)?,
    })
}

impl StoryStore for SqlitePlatformStore {
    fn insert_story(
        &self,
        user_id: usize,
        content: Option<&str>,
        media: &StoredMedia,
        created: i64,
        expires_at: i64,
    ) -> Result<Story> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO story (user_id, content, media_url, media_type, created, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                content,
                media.url,
                media.media_type.as_str(),
                created,
                expires_at
            ],
        )
        .with_context(|| format!("Failed to insert story for user {}", user_id))?;
        Ok(Story {
            id: conn.last_insert_rowid() as usize,
            user_id,
            content: content.map(str::to_string),
            media_url: media.url.clone(),
            media_type: media.media_type,
            created,
            expires_at,
        })
    }

    fn get_story(&self, story_id: usize) -> Result<Option<Story>> {
        let Some(story_id) = row_id(story_id) else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM story WHERE id = ?1", STORY_COLUMNS),
                params![story_id],
                story_from_row,
            )
            .optional()?)
    }

    fn delete_story(&self, story_id: usize) -> Result<Option<Story>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let story = tx
            .query_row(
                &format!("SELECT {} FROM story WHERE id = ?1", STORY_COLUMNS),
                params![story_id],
                story_from_row,
            )
            .optional()?;
        if story.is_some() {
            tx.execute("DELETE FROM story WHERE id = ?1", params![story_id])?;
            tx.commit()?;
        }
        Ok(story)
    }

    fn list_active_stories(&self, now: i64, page: Page) -> Result<Paged<Story>> {
        let conn = self.conn.lock().unwrap();
        let total: usize = conn.query_row(
            "SELECT COUNT(*) FROM story WHERE expires_at > ?1",
            params![now],
            |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM story WHERE expires_at > ?1
             ORDER BY created DESC, id DESC LIMIT ?2 OFFSET ?3",
            STORY_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![now, page.size, page.offset()], story_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paged::new(items, page, total))
    }

    fn list_user_active_stories(&self, user_id: usize, now: i64) -> Result<Vec<Story>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM story WHERE user_id = ?1 AND expires_at > ?2
             ORDER BY created DESC, id DESC",
            STORY_COLUMNS
        ))?;
        let stories = stmt
            .query_map(params![user_id, now], story_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stories)
    }

    fn list_followed_active_stories(&self, viewer_id: usize, now: i64) -> Result<Vec<Story>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM story
             WHERE user_id IN (SELECT followed_id FROM follow WHERE follower_id = ?1)
               AND expires_at > ?2
             ORDER BY created DESC, id DESC",
            STORY_COLUMNS
        ))?;
        let stories = stmt
            .query_map(params![viewer_id, now], story_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stories)
    }

    fn has_active_stories(&self, user_id: usize, now: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM story WHERE user_id = ?1 AND expires_at > ?2)",
            params![user_id, now],
            |row| row.get(0),
        )?)
    }

    fn add_story_view(&self, story_id: usize, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO story_view (story_id, user_id) VALUES (?1, ?2)",
                params![story_id, user_id],
            )
            .with_context(|| format!("Failed to record view of story {}", story_id))?;
        Ok(inserted > 0)
    }

    fn count_story_views(&self, story_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM story_view WHERE story_id = ?1",
            params![story_id],
            |row| row.get(0),
        )?)
    }

    fn has_viewed_story(&self, story_id: usize, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM story_view WHERE story_id = ?1 AND user_id = ?2)",
            params![story_id, user_id],
            |row| row.get(0),
        )?)
    }

    fn purge_expired_stories(&self, now: i64) -> Result<Vec<Story>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let expired = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM story WHERE expires_at <= ?1",
                STORY_COLUMNS
            ))?;
            let stories = stmt
                .query_map(params![now], story_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            stories
        };
        if !expired.is_empty() {
            tx.execute("DELETE FROM story WHERE expires_at <= ?1", params![now])
                .context("Failed to purge expired stories")?;
        }
        tx.commit()?;
        Ok(expired)
    }
}
