use super::context::JobContext;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSchedule {
    /// Every `interval`, starting one interval after registration.
    Interval(Duration),
}

impl JobSchedule {
    pub fn interval(&self) -> Duration {
        match self {
            JobSchedule::Interval(interval) => *interval,
        }
    }
}

/// What the scheduler does with a running job when the server stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownBehavior {
    #[default]
    Cancellable,
    WaitForCompletion,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found")]
    NotFound,

    #[error("Job is already running")]
    AlreadyRunning,

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Job was cancelled")]
    Cancelled,
}

/// A unit of periodic maintenance work.
///
/// `execute` runs inside `spawn_blocking`; async work goes through
/// `ctx.runtime`. Long runs should poll `ctx.is_cancelled()` and bail out
/// with [`JobError::Cancelled`].
pub trait BackgroundJob: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn schedule(&self) -> JobSchedule;

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        ShutdownBehavior::default()
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError>;
}
