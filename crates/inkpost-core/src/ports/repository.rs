use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts, newest created first.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts authored by `author_id`, newest created first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Atomically add `user_id` to the post's like set and return the
    /// updated post. Adding an already-present liker is a no-op - two
    /// concurrent calls from different users must both land.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError>;

    /// Atomically remove `user_id` from the post's like set and return the
    /// updated post. Removing an absent liker is a no-op.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError>;
}
