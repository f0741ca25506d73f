use super::models::{Notification, NotificationType};
use crate::store::{Page, Paged};
use anyhow::Result;

pub trait NotificationStore: Send + Sync {
    fn create_notification(
        &self,
        user_id: usize,
        message: &str,
        notification_type: NotificationType,
        reference_id: Option<usize>,
        created: i64,
    ) -> Result<Notification>;

    fn get_notification(&self, id: usize) -> Result<Option<Notification>>;

    /// Newest first.
    fn list_notifications(&self, user_id: usize, page: Page) -> Result<Paged<Notification>>;

    /// Returns false if no notification with this id belongs to the user.
    fn mark_notification_read(&self, id: usize, user_id: usize) -> Result<bool>;

    /// Marks every unread notification created at or before `up_to` as read.
    /// Returns the number of notifications updated.
    fn mark_all_notifications_read(&self, user_id: usize, up_to: i64) -> Result<usize>;

    fn count_unread_notifications(&self, user_id: usize) -> Result<usize>;

    /// Returns false if no notification with this id belongs to the user.
    fn delete_notification(&self, id: usize, user_id: usize) -> Result<bool>;
}
