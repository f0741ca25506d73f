mod api_error;
mod auth_routes;
pub mod config;
mod extractors;
mod feedback_routes;
mod http_layers;
mod learning_plan_routes;
mod multipart_form;
mod notification_routes;
mod post_routes;
pub mod server;
mod session;
pub mod state;
mod story_routes;
mod user_routes;

pub use api_error::{ApiError, ApiResult};
pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use state::ServerState;
