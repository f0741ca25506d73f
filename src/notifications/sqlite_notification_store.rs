use super::models::{Notification, NotificationType};
use super::store::NotificationStore;
use crate::store::{parse_text_column, row_id, Page, Paged, SqlitePlatformStore};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, message, notification_type, reference_id, is_read, created";

fn notification_from_row(row: &Row) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        notification_type: parse_text_column(row, 3)?,
        reference_id: row.get(4)?,
        is_read: row.get(5)?,
        created: row.get(6)?,
    })
}

impl NotificationStore for SqlitePlatformStore {
    fn create_notification(
        &self,
        user_id: usize,
        message: &str,
        notification_type: NotificationType,
        reference_id: Option<usize>,
        created: i64,
    ) -> Result<Notification> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO notification (user_id, message, notification_type, reference_id, created)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                message,
                notification_type.as_str(),
                reference_id,
                created
            ],
        )
        .with_context(|| format!("Failed to create notification for user {}", user_id))?;
        Ok(Notification {
            id: conn.last_insert_rowid() as usize,
            user_id,
            message: message.to_string(),
            notification_type,
            reference_id,
            is_read: false,
            created,
        })
    }

    fn get_notification(&self, id: usize) -> Result<Option<Notification>> {
        let Some(id) = row_id(id) else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {} FROM notification WHERE id = ?1",
                    NOTIFICATION_COLUMNS
                ),
                params![id],
                notification_from_row,
            )
            .optional()?)
    }

    fn list_notifications(&self, user_id: usize, page: Page) -> Result<Paged<Notification>> {
        let conn = self.conn.lock().unwrap();
        let total: usize = conn.query_row(
            "SELECT COUNT(*) FROM notification WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notification WHERE user_id = ?1
             ORDER BY created DESC, id DESC LIMIT ?2 OFFSET ?3",
            NOTIFICATION_COLUMNS
        ))?;
        let items = stmt
            .query_map(
                params![user_id, page.size, page.offset()],
                notification_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paged::new(items, page, total))
    }

    fn mark_notification_read(&self, id: usize, user_id: usize) -> Result<bool> {
        let Some(id) = row_id(id) else {
            return Ok(false);
        };
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE notification SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(updated > 0)
    }

    fn mark_all_notifications_read(&self, user_id: usize, up_to: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE notification SET is_read = 1
             WHERE user_id = ?1 AND is_read = 0 AND created <= ?2",
            params![user_id, up_to],
        )?;
        Ok(updated)
    }

    fn count_unread_notifications(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM notification WHERE user_id = ?1 AND is_read = 0",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    fn delete_notification(&self, id: usize, user_id: usize) -> Result<bool> {
        let Some(id) = row_id(id) else {
            return Ok(false);
        };
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM notification WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{NewUser, UserStore};

    fn store_with_user() -> (SqlitePlatformStore, usize) {
        let store = SqlitePlatformStore::in_memory().unwrap();
        let user_id = store
            .create_user(&NewUser {
                username: "owner".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: "hash".to_string(),
                name: "Owner".to_string(),
            })
            .unwrap();
        (store, user_id)
    }

    #[test]
    fn lists_newest_first_with_total() {
        let (store, user) = store_with_user();
        for i in 0..3 {
            store
                .create_notification(user, &format!("n{}", i), NotificationType::Like, Some(1), 100 + i)
                .unwrap();
        }

        let page = store.list_notifications(user, Page::new(0, 2)).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].message, "n2");
        assert_eq!(page.items[1].message, "n1");

        let page = store.list_notifications(user, Page::new(1, 2)).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].message, "n0");
    }

    #[test]
    fn mark_read_requires_ownership() {
        let (store, user) = store_with_user();
        let n = store
            .create_notification(user, "hello", NotificationType::Follow, None, 100)
            .unwrap();

        assert!(!store.mark_notification_read(n.id, user + 1).unwrap());
        assert_eq!(store.count_unread_notifications(user).unwrap(), 1);

        assert!(store.mark_notification_read(n.id, user).unwrap());
        assert_eq!(store.count_unread_notifications(user).unwrap(), 0);
        assert!(store.get_notification(n.id).unwrap().unwrap().is_read);
    }

    #[test]
    fn mark_all_read_leaves_later_notifications() {
        let (store, user) = store_with_user();
        store
            .create_notification(user, "old", NotificationType::Comment, Some(1), 100)
            .unwrap();
        store
            .create_notification(user, "also old", NotificationType::Comment, Some(1), 200)
            .unwrap();
        store
            .create_notification(user, "new", NotificationType::Like, Some(1), 300)
            .unwrap();

        assert_eq!(store.mark_all_notifications_read(user, 200).unwrap(), 2);
        assert_eq!(store.count_unread_notifications(user).unwrap(), 1);
        assert_eq!(store.mark_all_notifications_read(user, 200).unwrap(), 0);
    }

    #[test]
    fn deletes_only_own_notification() {
        let (store, user) = store_with_user();
        let n = store
            .create_notification(user, "bye", NotificationType::Like, None, 100)
            .unwrap();
        assert!(!store.delete_notification(n.id, user + 1).unwrap());
        assert!(store.delete_notification(n.id, user).unwrap());
        assert!(store.get_notification(n.id).unwrap().is_none());
    }
}
