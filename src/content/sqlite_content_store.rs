use super::content_store::ContentStore;
use super::models::{Comment, Post, PostMedia, PostType};
use crate::media::StoredMedia;
use crate::store::{parse_text_column, row_id, Page, Paged, SqlitePlatformStore};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

const POST_COLUMNS: &str = "id, user_id, content, post_type, created, updated";
const COMMENT_COLUMNS: &str = "id, post_id, user_id, content, created, updated";

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content: row.get(2)?,
        post_type: parse_text_column(row, 3)?,
        media: vec![],
        created: row.get(4)?,
        updated: row.get(5)?,
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        created: row.get(4)?,
        updated: row.get(5)?,
    })
}

fn load_media(conn: &Connection, post_id: usize) -> Result<Vec<PostMedia>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, media_type, url, position FROM post_media
         WHERE post_id = ?1 ORDER BY position ASC",
    )?;
    let media = stmt
        .query_map(params![post_id], |row| {
            Ok(PostMedia {
                id: row.get(0)?,
                media_type: parse_text_column(row, 1)?,
                url: row.get(2)?,
                position: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(media)
}

fn load_post(conn: &Connection, post_id: usize) -> Result<Option<Post>> {
    let post = conn
        .query_row(
            &format!("SELECT {} FROM post WHERE id = ?1", POST_COLUMNS),
            params![post_id],
            post_from_row,
        )
        .optional()?;
    match post {
        Some(mut post) => {
            post.media = load_media(conn, post.id)?;
            Ok(Some(post))
        }
        None => Ok(None),
    }
}

/// Runs a paged post listing restricted by `filter`, a WHERE clause using
/// positional parameters `?1..`.
fn query_posts(
    conn: &Connection,
    filter: &str,
    filter_params: &[&dyn ToSql],
    page: Page,
) -> Result<Paged<Post>> {
    let total: usize = conn.query_row(
        &format!("SELECT COUNT(*) FROM post WHERE {}", filter),
        filter_params,
        |row| row.get(0),
    )?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM post WHERE {} ORDER BY created DESC, id DESC LIMIT {} OFFSET {}",
        POST_COLUMNS,
        filter,
        page.size,
        page.offset()
    ))?;
    let mut posts = stmt
        .query_map(filter_params, post_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    for post in posts.iter_mut() {
        post.media = load_media(conn, post.id)?;
    }
    Ok(Paged::new(posts, page, total))
}

impl ContentStore for SqlitePlatformStore {
    fn insert_post(
        &self,
        user_id: usize,
        content: &str,
        post_type: PostType,
        media: &[StoredMedia],
        created: i64,
    ) -> Result<Post> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO post (user_id, content, post_type, created) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, content, post_type.as_str(), created],
        )
        .with_context(|| format!("Failed to insert post for user {}", user_id))?;
        let post_id = tx.last_insert_rowid() as usize;

        let mut post_media = Vec::with_capacity(media.len());
        for (position, item) in media.iter().enumerate() {
            tx.execute(
                "INSERT INTO post_media (post_id, media_type, url, position) VALUES (?1, ?2, ?3, ?4)",
                params![post_id, item.media_type.as_str(), item.url, position],
            )
            .with_context(|| format!("Failed to insert media for post {}", post_id))?;
            post_media.push(PostMedia {
                id: tx.last_insert_rowid() as usize,
                media_type: item.media_type,
                url: item.url.clone(),
                position,
            });
        }

        tx.commit()?;

        Ok(Post {
            id: post_id,
            user_id,
            content: content.to_string(),
            post_type,
            media: post_media,
            created,
            updated: None,
        })
    }

    fn get_post(&self, post_id: usize) -> Result<Option<Post>> {
        if row_id(post_id).is_none() {
            return Ok(None);
        }
        let conn = self.conn.lock().unwrap();
        load_post(&conn, post_id)
    }

    fn update_post(
        &self,
        post_id: usize,
        content: &str,
        post_type: PostType,
        updated: i64,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE post SET content = ?1, post_type = ?2, updated = ?3 WHERE id = ?4",
            params![content, post_type.as_str(), updated, post_id],
        )?;
        Ok(changed > 0)
    }

    fn delete_post(&self, post_id: usize) -> Result<Option<Post>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let post = match load_post(&tx, post_id)? {
            Some(post) => post,
            None => return Ok(None),
        };
        tx.execute("DELETE FROM post WHERE id = ?1", params![post_id])
            .with_context(|| format!("Failed to delete post {}", post_id))?;
        tx.commit()?;

        Ok(Some(post))
    }

    fn list_posts(&self, page: Page) -> Result<Paged<Post>> {
        let conn = self.conn.lock().unwrap();
        query_posts(&conn, "1 = 1", &[], page)
    }

    fn list_user_posts(&self, user_id: usize, page: Page) -> Result<Paged<Post>> {
        let conn = self.conn.lock().unwrap();
        query_posts(&conn, "user_id = ?1", &[&user_id], page)
    }

    fn list_followed_posts(&self, viewer_id: usize, page: Page) -> Result<Paged<Post>> {
        let conn = self.conn.lock().unwrap();
        query_posts(
            &conn,
            "user_id IN (SELECT followed_id FROM follow WHERE follower_id = ?1)",
            &[&viewer_id],
            page,
        )
    }

    fn search_posts(&self, query: &str, page: Page) -> Result<Paged<Post>> {
        let conn = self.conn.lock().unwrap();
        query_posts(&conn, "instr(lower(content), lower(?1)) > 0", &[&query], page)
    }

    fn insert_comment(
        &self,
        post_id: usize,
        user_id: usize,
        content: &str,
        created: i64,
    ) -> Result<Comment> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO comment (post_id, user_id, content, created) VALUES (?1, ?2, ?3, ?4)",
            params![post_id, user_id, content, created],
        )
        .with_context(|| format!("Failed to insert comment on post {}", post_id))?;
        Ok(Comment {
            id: conn.last_insert_rowid() as usize,
            post_id,
            user_id,
            content: content.to_string(),
            created,
            updated: None,
        })
    }

    fn get_comment(&self, comment_id: usize) -> Result<Option<Comment>> {
        let Some(comment_id) = row_id(comment_id) else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM comment WHERE id = ?1", COMMENT_COLUMNS),
                params![comment_id],
                comment_from_row,
            )
            .optional()?)
    }

    fn update_comment(&self, comment_id: usize, content: &str, updated: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE comment SET content = ?1, updated = ?2 WHERE id = ?3",
            params![content, updated, comment_id],
        )?;
        Ok(changed > 0)
    }

    fn delete_comment(&self, comment_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM comment WHERE id = ?1", params![comment_id])?;
        Ok(deleted > 0)
    }

    fn list_comments(&self, post_id: usize, page: Page) -> Result<Paged<Comment>> {
        let conn = self.conn.lock().unwrap();
        let total: usize = conn.query_row(
            "SELECT COUNT(*) FROM comment WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM comment WHERE post_id = ?1
             ORDER BY created DESC, id DESC LIMIT ?2 OFFSET ?3",
            COMMENT_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![post_id, page.size, page.offset()], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paged::new(items, page, total))
    }

    fn count_comments(&self, post_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM comment WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?)
    }

    fn add_like(&self, post_id: usize, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO post_like (post_id, user_id) VALUES (?1, ?2)",
                params![post_id, user_id],
            )
            .with_context(|| format!("Failed to like post {}", post_id))?;
        Ok(inserted > 0)
    }

    fn remove_like(&self, post_id: usize, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM post_like WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    fn count_likes(&self, post_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM post_like WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?)
    }

    fn is_liked(&self, post_id: usize, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM post_like WHERE post_id = ?1 AND user_id = ?2)",
            params![post_id, user_id],
            |row| row.get(0),
        )?)
    }
}
