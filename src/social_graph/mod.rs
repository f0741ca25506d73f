//! Who follows whom.

mod graph_store;
mod social_graph;
mod sqlite_graph_store;

pub use graph_store::GraphStore;
pub use social_graph::SocialGraph;
