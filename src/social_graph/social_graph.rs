use crate::error::{ServiceError, ServiceResult};
use crate::notifications::{NotificationService, NotificationType};
use crate::outcome::Outcome;
use crate::store::{unix_now, PlatformStore};
use crate::user::{build_profile, User, UserProfile};
use std::sync::Arc;
use tracing::debug;

pub struct SocialGraph {
    store: Arc<dyn PlatformStore>,
    notifications: Arc<NotificationService>,
}

impl SocialGraph {
    pub fn new(store: Arc<dyn PlatformStore>, notifications: Arc<NotificationService>) -> Self {
        Self {
            store,
            notifications,
        }
    }

    fn require_user(&self, user_id: usize) -> ServiceResult<User> {
        self.store
            .get_user(user_id)?
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    /// Follows `target`. Following someone already followed changes nothing.
    /// The outcome value tells whether a new edge was created.
    pub fn follow(&self, actor: usize, target: usize) -> ServiceResult<Outcome<bool>> {
        if actor == target {
            return Err(ServiceError::SelfFollow);
        }
        let actor_user = self.require_user(actor)?;
        self.require_user(target)?;

        let created = self.store.add_follow(actor, target)?;
        let mut outcome = Outcome::new(created);
        if created {
            debug!("User {} now follows {}", actor, target);
            outcome.absorb(self.notifications.notify(
                target,
                actor,
                &format!("{} started following you", actor_user.username),
                NotificationType::Follow,
                Some(actor),
            ));
        }
        Ok(outcome)
    }

    /// Returns whether an edge was removed. Unfollowing someone not followed is a no-op.
    pub fn unfollow(&self, actor: usize, target: usize) -> ServiceResult<bool> {
        self.require_user(target)?;
        Ok(self.store.remove_follow(actor, target)?)
    }

    pub fn is_following(&self, actor: usize, target: usize) -> ServiceResult<bool> {
        self.require_user(target)?;
        Ok(self.store.is_following(actor, target)?)
    }

    pub fn list_followers(
        &self,
        user_id: usize,
        viewer: Option<usize>,
    ) -> ServiceResult<Vec<UserProfile>> {
        self.require_user(user_id)?;
        let ids = self.store.list_follower_ids(user_id)?;
        self.profiles(ids, viewer)
    }

    pub fn list_following(
        &self,
        user_id: usize,
        viewer: Option<usize>,
    ) -> ServiceResult<Vec<UserProfile>> {
        self.require_user(user_id)?;
        let ids = self.store.list_following_ids(user_id)?;
        self.profiles(ids, viewer)
    }

    fn profiles(&self, ids: Vec<usize>, viewer: Option<usize>) -> ServiceResult<Vec<UserProfile>> {
        let now = unix_now();
        let mut profiles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.store.get_user(id)? {
                profiles.push(build_profile(self.store.as_ref(), user, viewer, now)?);
            }
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::{Page, SqlitePlatformStore};
    use crate::user::{NewUser, UserStore};

    struct Fixture {
        graph: SocialGraph,
        notifications: Arc<NotificationService>,
        a: usize,
        b: usize,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(SqlitePlatformStore::in_memory().unwrap());
        let mut ids = vec![];
        for name in ["anna", "ben"] {
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
        let notifications = Arc::new(NotificationService::new(store.clone()));
        Fixture {
            graph: SocialGraph::new(store, notifications.clone()),
            notifications,
            a: ids[0],
            b: ids[1],
        }
    }

    #[test]
    fn follow_round_trip() {
        let f = fixture();
        assert!(f.graph.follow(f.a, f.b).unwrap().value);
        assert!(f.graph.is_following(f.a, f.b).unwrap());
        assert!(!f.graph.is_following(f.b, f.a).unwrap());

        let followers = f.graph.list_followers(f.b, None).unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].id, f.a);
        let following = f.graph.list_following(f.a, None).unwrap();
        assert_eq!(following[0].id, f.b);
        assert_eq!(following[0].followers_count, 1);

        assert!(f.graph.unfollow(f.a, f.b).unwrap());
        assert!(!f.graph.is_following(f.a, f.b).unwrap());
    }

    #[test]
    fn double_follow_is_idempotent_and_notifies_once() {
        let f = fixture();
        assert!(f.graph.follow(f.a, f.b).unwrap().value);
        assert!(!f.graph.follow(f.a, f.b).unwrap().value);

        assert_eq!(f.graph.list_followers(f.b, None).unwrap().len(), 1);
        let notifications = f.notifications.list(f.b, Page::default()).unwrap();
        assert_eq!(notifications.total, 1);
        assert_eq!(notifications.items[0].message, "anna started following you");
    }

    #[test]
    fn unfollow_when_not_following_is_noop() {
        let f = fixture();
        assert!(!f.graph.unfollow(f.a, f.b).unwrap());
    }

    #[test]
    fn self_follow_is_rejected() {
        let f = fixture();
        let err = f.graph.follow(f.a, f.a).unwrap_err();
        assert!(matches!(err, ServiceError::SelfFollow));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn following_missing_user_is_not_found() {
        let f = fixture();
        assert_eq!(
            f.graph.follow(f.a, 999).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn profiles_reflect_viewer() {
        let f = fixture();
        f.graph.follow(f.a, f.b).unwrap();
        let followers = f.graph.list_followers(f.b, Some(f.b)).unwrap();
        // b does not follow a back
        assert!(!followers[0].is_following);
        f.graph.follow(f.b, f.a).unwrap();
        let followers = f.graph.list_followers(f.b, Some(f.b)).unwrap();
        assert!(followers[0].is_following);
    }
}
