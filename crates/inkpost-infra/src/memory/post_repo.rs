//! In-memory post repository backed by a HashMap with async RwLock.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpost_core::domain::Post;
use inkpost_core::error::RepoError;
use inkpost_core::ports::{BaseRepository, PostRepository};

/// In-memory post store.
///
/// Like mutations happen under a single write lock, which gives the same
/// per-post atomicity the database provides with its add-to-set primitive.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(newest_first(store.values().cloned().collect()))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(newest_first(
            store
                .values()
                .filter(|p| p.author_id == author_id)
                .cloned()
                .collect(),
        ))
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.add_like(user_id);
        Ok(post.clone())
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.remove_like(user_id);
        Ok(post.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    fn post(author: Uuid, title: &str) -> Post {
        Post::new(author, title.to_string(), "content".to_string(), None)
    }

    #[tokio::test]
    async fn find_all_returns_newest_first() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();

        let mut older = post(author, "older");
        older.created_at = Utc::now() - TimeDelta::minutes(5);
        let newer = post(author, "newer");

        repo.save(older).await.unwrap();
        repo.save(newer).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all[0].title, "newer");
        assert_eq!(all[1].title, "older");
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn find_by_author_filters_and_orders() {
        let repo = InMemoryPostRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        repo.save(post(alice, "a1")).await.unwrap();
        repo.save(post(bob, "b1")).await.unwrap();

        let mine = repo.find_by_author(alice).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "a1");
    }

    #[tokio::test]
    async fn add_like_twice_counts_once() {
        let repo = InMemoryPostRepository::new();
        let liker = Uuid::new_v4();
        let saved = repo.save(post(Uuid::new_v4(), "p")).await.unwrap();

        repo.add_like(saved.id, liker).await.unwrap();
        let updated = repo.add_like(saved.id, liker).await.unwrap();

        assert_eq!(updated.likes_count(), 1);
    }

    #[tokio::test]
    async fn remove_like_never_goes_negative() {
        let repo = InMemoryPostRepository::new();
        let saved = repo.save(post(Uuid::new_v4(), "p")).await.unwrap();

        let updated = repo.remove_like(saved.id, Uuid::new_v4()).await.unwrap();
        assert_eq!(updated.likes_count(), 0);
    }

    #[tokio::test]
    async fn like_on_missing_post_is_not_found() {
        let repo = InMemoryPostRepository::new();

        let result = repo.add_like(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn concurrent_likes_from_different_users_both_land() {
        let repo = std::sync::Arc::new(InMemoryPostRepository::new());
        let saved = repo.save(post(Uuid::new_v4(), "p")).await.unwrap();

        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let (ra, rb) = tokio::join!(
            repo.add_like(saved.id, a),
            repo.add_like(saved.id, b)
        );
        ra.unwrap();
        rb.unwrap();

        let current = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(current.likes_count(), 2);
    }
}
