//! Story expiry sweep.
//!
//! Expired stories are already hidden from every listing, the sweep
//! reclaims their records and media files.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError, JobSchedule, ShutdownBehavior},
};
use crate::store::unix_now;
use std::time::Duration;
use tracing::info;

pub struct StoryExpiryJob {
    interval: Duration,
}

impl StoryExpiryJob {
    pub const ID: &'static str = "story_expiry";

    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl BackgroundJob for StoryExpiryJob {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Story Expiry"
    }

    fn description(&self) -> &'static str {
        "Delete stories older than 24 hours together with their media"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(self.interval)
    }

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        // Stories are purged in one transaction, so stopping between runs loses nothing
        ShutdownBehavior::Cancellable
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let report = ctx
            .runtime
            .block_on(ctx.stories.purge_expired(unix_now()))
            .map_err(|e| JobError::ExecutionFailed(e.to_string()))?;

        if report.purged > 0 {
            info!(
                "Story sweep removed {} stories, {} media files could not be deleted",
                report.purged, report.media_failures
            );
        }

        Ok(())
    }
}
