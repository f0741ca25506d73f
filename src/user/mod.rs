pub mod auth;
mod sqlite_user_store;
mod user_manager;
pub mod user_models;
mod user_store;

pub(crate) use user_manager::build_profile;
pub use user_manager::UserManager;
pub use user_models::{
    AuthSession, NewUser, ProfileUpdate, RegisterRequest, User, UserProfile, UserSummary,
};
pub use user_store::UserStore;
