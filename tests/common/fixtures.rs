//! Test fixture creation for the database

use super::constants::*;
use anyhow::Result;
use skillshare_server::user::auth::hash_password;
use skillshare_server::user::{NewUser, UserStore};
use skillshare_server::SqlitePlatformStore;
use tempfile::TempDir;

/// Ids of the users seeded by [`create_test_db_with_users`].
pub struct SeededUsers {
    pub alice: usize,
    pub bob: usize,
}

/// Creates a temporary database holding two users, alice and bob,
/// both with password [`TEST_PASS`].
/// Returns (temp_dir, store, seeded user ids)
pub fn create_test_db_with_users() -> Result<(TempDir, SqlitePlatformStore, SeededUsers)> {
    let dir = TempDir::new()?;
    let store = SqlitePlatformStore::new(dir.path().join("skillshare.db"))?;

    let password_hash = hash_password(TEST_PASS)?;
    let create = |username: &str| {
        store.create_user(&NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: password_hash.clone(),
            name: username.to_string(),
        })
    };
    let users = SeededUsers {
        alice: create(ALICE)?,
        bob: create(BOB)?,
    };

    Ok((dir, store, users))
}
