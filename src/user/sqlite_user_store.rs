use super::user_models::{NewUser, User};
use super::user_store::UserStore;
use crate::store::{row_id, SqlitePlatformStore};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, name, bio, location, avatar_url, created";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        name: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        avatar_url: row.get(7)?,
        created: row.get(8)?,
    })
}

impl UserStore for SqlitePlatformStore {
    fn create_user(&self, user: &NewUser) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user (username, email, password_hash, name) VALUES (?1, ?2, ?3, ?4)",
            params![user.username, user.email, user.password_hash, user.name],
        )
        .with_context(|| format!("Failed to create user {}", user.username))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let Some(user_id) = row_id(user_id) else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM user WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM user WHERE username = ?1", USER_COLUMNS),
                params![username],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_by_username_or_email(&self, username_or_email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {} FROM user WHERE username = ?1 OR email = ?1
                     ORDER BY CASE WHEN username = ?1 THEN 0 ELSE 1 END LIMIT 1",
                    USER_COLUMNS
                ),
                params![username_or_email],
                user_from_row,
            )
            .optional()?)
    }

    fn is_username_taken(&self, username: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE username = ?1)",
            params![username],
            |row| row.get(0),
        )?)
    }

    fn is_email_taken(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )?)
    }

    fn update_user_profile(
        &self,
        user_id: usize,
        name: Option<&str>,
        bio: Option<&str>,
        location: Option<&str>,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE user SET name = COALESCE(?2, name), bio = COALESCE(?3, bio),
             location = COALESCE(?4, location) WHERE id = ?1",
            params![user_id, name, bio, location],
        )?;
        Ok(updated > 0)
    }

    fn search_users(&self, query: &str, limit: usize) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM user
             WHERE instr(lower(username), lower(?1)) > 0 OR instr(lower(name), lower(?1)) > 0
             ORDER BY username LIMIT ?2",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map(params![query, limit], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn most_followed_users(&self, exclude: Option<usize>, limit: usize) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, u.email, u.password_hash, u.name, u.bio, u.location,
                    u.avatar_url, u.created
             FROM user u LEFT JOIN follow f ON f.followed_id = u.id
             WHERE ?1 IS NULL OR u.id != ?1
             GROUP BY u.id
             ORDER BY COUNT(f.id) DESC, u.id ASC
             LIMIT ?2",
        )?;
        let users = stmt
            .query_map(params![exclude, limit], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}
