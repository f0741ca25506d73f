use anyhow::Result;

/// Directed follow edges, follower -> followed.
pub trait GraphStore: Send + Sync {
    /// Returns true if the edge was created, false if it already existed.
    fn add_follow(&self, follower_id: usize, followed_id: usize) -> Result<bool>;

    /// Returns true if an edge was removed.
    fn remove_follow(&self, follower_id: usize, followed_id: usize) -> Result<bool>;

    fn is_following(&self, follower_id: usize, followed_id: usize) -> Result<bool>;

    fn count_followers(&self, user_id: usize) -> Result<usize>;

    fn count_following(&self, user_id: usize) -> Result<usize>;

    /// Most recent edge first.
    fn list_follower_ids(&self, user_id: usize) -> Result<Vec<usize>>;

    /// Most recent edge first.
    fn list_following_ids(&self, user_id: usize) -> Result<Vec<usize>>;
}
