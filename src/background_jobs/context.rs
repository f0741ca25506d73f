use crate::stories::StoryManager;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Runtime the scheduler lives on, for jobs that drive async work.
    pub runtime: Handle,

    pub stories: Arc<StoryManager>,
}

impl JobContext {
    /// Must be called from within a tokio runtime.
    pub fn new(cancellation_token: CancellationToken, stories: Arc<StoryManager>) -> Self {
        Self {
            cancellation_token,
            runtime: Handle::current(),
            stories,
        }
    }

    /// Same resources, different cancellation token.
    pub fn with_token(&self, cancellation_token: CancellationToken) -> Self {
        Self {
            cancellation_token,
            runtime: self.runtime.clone(),
            stories: Arc::clone(&self.stories),
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
