use super::graph_store::GraphStore;
use crate::store::SqlitePlatformStore;
use anyhow::{Context, Result};
use rusqlite::params;

impl GraphStore for SqlitePlatformStore {
    fn add_follow(&self, follower_id: usize, followed_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO follow (follower_id, followed_id) VALUES (?1, ?2)",
                params![follower_id, followed_id],
            )
            .with_context(|| format!("Failed to add follow {} -> {}", follower_id, followed_id))?;
        Ok(inserted > 0)
    }

    fn remove_follow(&self, follower_id: usize, followed_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM follow WHERE follower_id = ?1 AND followed_id = ?2",
            params![follower_id, followed_id],
        )?;
        Ok(deleted > 0)
    }

    fn is_following(&self, follower_id: usize, followed_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM follow WHERE follower_id = ?1 AND followed_id = ?2)",
            params![follower_id, followed_id],
            |row| row.get(0),
        )?)
    }

    fn count_followers(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM follow WHERE followed_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    fn count_following(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM follow WHERE follower_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    fn list_follower_ids(&self, user_id: usize) -> Result<Vec<usize>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT follower_id FROM follow WHERE followed_id = ?1 ORDER BY created DESC, id DESC",
        )?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<usize>, _>>()?;
        Ok(ids)
    }

    fn list_following_ids(&self, user_id: usize) -> Result<Vec<usize>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT followed_id FROM follow WHERE follower_id = ?1 ORDER BY created DESC, id DESC",
        )?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<usize>, _>>()?;
        Ok(ids)
    }
}
