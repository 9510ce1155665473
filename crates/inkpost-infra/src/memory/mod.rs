//! In-memory repositories - used as fallback when no database is configured,
//! and as the storage double in tests.
//!
//! Note: Data is lost on process restart.

mod post_repo;
mod user_repo;

pub use post_repo::InMemoryPostRepository;
pub use user_repo::InMemoryUserRepository;
