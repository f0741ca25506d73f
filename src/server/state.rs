use axum::extract::FromRef;

use crate::content::ContentManager;
use crate::feed::FeedAssembler;
use crate::feedback::FeedbackManager;
use crate::learning_plans::LearningPlanManager;
use crate::media::MediaStorage;
use crate::notifications::NotificationService;
use crate::social_graph::SocialGraph;
use crate::stories::StoryManager;
use crate::store::PlatformStore;
use crate::user::auth::TokenIssuer;
use crate::user::UserManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedSocialGraph = Arc<SocialGraph>;
pub type GuardedContentManager = Arc<ContentManager>;
pub type GuardedFeedAssembler = Arc<FeedAssembler>;
pub type GuardedStoryManager = Arc<StoryManager>;
pub type GuardedNotificationService = Arc<NotificationService>;
pub type GuardedLearningPlanManager = Arc<LearningPlanManager>;
pub type GuardedFeedbackManager = Arc<FeedbackManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub user_manager: GuardedUserManager,
    pub social_graph: GuardedSocialGraph,
    pub content: GuardedContentManager,
    pub feed: GuardedFeedAssembler,
    pub stories: GuardedStoryManager,
    pub notifications: GuardedNotificationService,
    pub learning_plans: GuardedLearningPlanManager,
    pub feedback: GuardedFeedbackManager,
}

impl ServerState {
    /// Wires every service over the one store.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn PlatformStore>,
        media: Arc<MediaStorage>,
        tokens: TokenIssuer,
    ) -> ServerState {
        let notifications = Arc::new(NotificationService::new(store.clone()));
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_string(),
            user_manager: Arc::new(UserManager::new(store.clone(), tokens)),
            social_graph: Arc::new(SocialGraph::new(store.clone(), notifications.clone())),
            content: Arc::new(ContentManager::new(
                store.clone(),
                media.clone(),
                notifications.clone(),
            )),
            feed: Arc::new(FeedAssembler::new(store.clone())),
            stories: Arc::new(StoryManager::new(store.clone(), media)),
            notifications,
            learning_plans: Arc::new(LearningPlanManager::new(store.clone())),
            feedback: Arc::new(FeedbackManager::new(store)),
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedSocialGraph {
    fn from_ref(input: &ServerState) -> Self {
        input.social_graph.clone()
    }
}

impl FromRef<ServerState> for GuardedContentManager {
    fn from_ref(input: &ServerState) -> Self {
        input.content.clone()
    }
}

impl FromRef<ServerState> for GuardedFeedAssembler {
    fn from_ref(input: &ServerState) -> Self {
        input.feed.clone()
    }
}

impl FromRef<ServerState> for GuardedStoryManager {
    fn from_ref(input: &ServerState) -> Self {
        input.stories.clone()
    }
}

impl FromRef<ServerState> for GuardedNotificationService {
    fn from_ref(input: &ServerState) -> Self {
        input.notifications.clone()
    }
}

impl FromRef<ServerState> for GuardedLearningPlanManager {
    fn from_ref(input: &ServerState) -> Self {
        input.learning_plans.clone()
    }
}

impl FromRef<ServerState> for GuardedFeedbackManager {
    fn from_ref(input: &ServerState) -> Self {
        input.feedback.clone()
    }
}
