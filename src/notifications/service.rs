//! Notification service: best-effort fan-out and read state.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::outcome::{SecondaryEffect, SecondaryFailure};
use crate::store::{unix_now, Page, Paged, PlatformStore};

use super::models::{Notification, NotificationType};

pub struct NotificationService {
    store: Arc<dyn PlatformStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    /// Notifies `recipient` about something `actor` did.
    ///
    /// Acting on your own content notifies nobody. A failure to persist the
    /// notification is logged and handed back to the caller as a secondary
    /// failure, it never fails the operation that triggered it.
    pub fn notify(
        &self,
        recipient: usize,
        actor: usize,
        message: &str,
        notification_type: NotificationType,
        reference_id: Option<usize>,
    ) -> Result<(), SecondaryFailure> {
        if recipient == actor {
            return Ok(());
        }
        match self.store.create_notification(
            recipient,
            message,
            notification_type,
            reference_id,
            unix_now(),
        ) {
            Ok(notification) => {
                debug!(
                    "Created {} notification {} for user {}",
                    notification_type.as_str(),
                    notification.id,
                    recipient
                );
                Ok(())
            }
            Err(err) => {
                warn!("Failed to notify user {}: {}", recipient, err);
                Err(SecondaryFailure {
                    effect: SecondaryEffect::Notification { recipient },
                    reason: err.to_string(),
                })
            }
        }
    }

    pub fn list(&self, user_id: usize, page: Page) -> ServiceResult<Paged<Notification>> {
        Ok(self.store.list_notifications(user_id, page)?)
    }

    pub fn mark_read(&self, id: usize, caller: usize) -> ServiceResult<()> {
        if !self.store.mark_notification_read(id, caller)? {
            return Err(ServiceError::not_found("Notification", id));
        }
        Ok(())
    }

    /// Marks everything that exists at call time as read. Returns how many changed.
    pub fn mark_all_read(&self, caller: usize) -> ServiceResult<usize> {
        Ok(self
            .store
            .mark_all_notifications_read(caller, unix_now())?)
    }

    pub fn unread_count(&self, caller: usize) -> ServiceResult<usize> {
        Ok(self.store.count_unread_notifications(caller)?)
    }

    pub fn delete(&self, id: usize, caller: usize) -> ServiceResult<()> {
        if !self.store.delete_notification(id, caller)? {
            return Err(ServiceError::not_found("Notification", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::SqlitePlatformStore;
    use crate::user::{NewUser, UserStore};

    fn setup() -> (NotificationService, Arc<SqlitePlatformStore>, usize, usize) {
        let store = Arc::new(SqlitePlatformStore::in_memory().unwrap());
        let mut ids = vec![];
        for name in ["owner", "actor"] {
            ids.push(
                store
                    .create_user(&NewUser {
                        username: name.to_string(),
                        email: format!("{}@example.com", name),
                        password_hash: "hash".to_string(),
                        name: name.to_string(),
                    })
                    .unwrap(),
            );
        }
        (NotificationService::new(store.clone()), store, ids[0], ids[1])
    }

    #[test]
    fn self_actions_do_not_notify() {
        let (service, _, owner, _) = setup();
        service
            .notify(owner, owner, "x liked your post", NotificationType::Like, Some(1))
            .unwrap();
        assert_eq!(service.unread_count(owner).unwrap(), 0);
    }

    #[test]
    fn notifies_and_reads() {
        let (service, _, owner, actor) = setup();
        service
            .notify(owner, actor, "actor liked your post", NotificationType::Like, Some(1))
            .unwrap();
        service
            .notify(owner, actor, "actor commented on your post", NotificationType::Comment, Some(1))
            .unwrap();
        assert_eq!(service.unread_count(owner).unwrap(), 2);

        let listed = service.list(owner, Page::default()).unwrap();
        assert_eq!(listed.total, 2);
        service.mark_read(listed.items[0].id, owner).unwrap();
        assert_eq!(service.unread_count(owner).unwrap(), 1);

        assert_eq!(service.mark_all_read(owner).unwrap(), 1);
        assert_eq!(service.unread_count(owner).unwrap(), 0);
    }

    #[test]
    fn foreign_notification_is_not_found() {
        let (service, _, owner, actor) = setup();
        service
            .notify(owner, actor, "actor started following you", NotificationType::Follow, Some(actor))
            .unwrap();
        let id = service.list(owner, Page::default()).unwrap().items[0].id;

        assert_eq!(service.mark_read(id, actor).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(service.delete(id, actor).unwrap_err().kind(), ErrorKind::NotFound);
        service.delete(id, owner).unwrap();
    }

    #[test]
    fn persistence_failure_becomes_secondary_failure() {
        let (service, store, owner, actor) = setup();
        store
            .conn
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE notification")
            .unwrap();

        let failure = service
            .notify(owner, actor, "actor liked your post", NotificationType::Like, Some(1))
            .unwrap_err();
        assert_eq!(
            failure.effect,
            SecondaryEffect::Notification { recipient: owner }
        );
    }
}
