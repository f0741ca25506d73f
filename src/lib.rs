//! Skillshare server library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod background_jobs;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod feedback;
pub mod learning_plans;
pub mod media;
pub mod notifications;
pub mod outcome;
pub mod server;
pub mod social_graph;
pub mod sqlite_persistence;
pub mod stories;
pub mod store;
pub mod user;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig, ServerState};
pub use store::{PlatformStore, SqlitePlatformStore};
