//! User notifications module

mod models;
mod service;
mod sqlite_notification_store;
mod store;

pub use models::{Notification, NotificationType};
pub use service::NotificationService;
pub use store::NotificationStore;
