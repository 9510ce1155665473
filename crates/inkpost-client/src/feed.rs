//! The client-held post cache.
//!
//! [`PostFeed`] owns an ordered snapshot of posts fetched from the list
//! endpoint and reconciles it against service responses. The rules, in
//! order of importance:
//!
//! - a failed remote call never leaves the local state mutated;
//! - like/unlike replace the cached entry with the server's response, so
//!   counts cannot drift from the authoritative state;
//! - while a like/unlike for a post is in flight, further submissions for
//!   that post are suppressed (the view disables the affordance).

use std::collections::HashSet;

use uuid::Uuid;

use inkpost_shared::dto::{MessageResponse, PostResponse};

use crate::api::{ClientError, PostApi};

/// Where the feed is in its fetch lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Never fetched.
    Idle,
    /// A refresh round-trip is in progress; the view shows a loading state.
    Loading,
    /// Holding the result of the last successful refresh.
    Ready,
    /// The last refresh failed; previous entries are retained.
    Failed(String),
}

/// Ordered, client-held mirror of a subset of posts.
#[derive(Debug)]
pub struct PostFeed {
    posts: Vec<PostResponse>,
    status: FeedStatus,
    in_flight: HashSet<Uuid>,
}

impl PostFeed {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            status: FeedStatus::Idle,
            in_flight: HashSet::new(),
        }
    }

    pub fn posts(&self) -> &[PostResponse] {
        &self.posts
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    /// Whether a like/unlike call for this post is still in flight (the view
    /// disables the like affordance while this is true).
    pub fn is_like_pending(&self, post_id: Uuid) -> bool {
        self.in_flight.contains(&post_id)
    }

    /// Whether `viewer` has liked the given post, per the cached state.
    pub fn liked(&self, post_id: Uuid, viewer: Uuid) -> bool {
        self.posts
            .iter()
            .find(|p| p.id == post_id)
            .is_some_and(|p| p.liked_by(viewer))
    }

    /// Replace the cache wholesale with the latest list result. On failure
    /// the previous entries are retained and the error message is recorded.
    pub async fn refresh(&mut self, api: &impl PostApi) -> Result<(), ClientError> {
        self.status = FeedStatus::Loading;

        match api.list_posts().await {
            Ok(posts) => {
                self.posts = posts;
                self.status = FeedStatus::Ready;
                Ok(())
            }
            Err(e) => {
                self.status = FeedStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Prepend a freshly created post. Called only after a successful
    /// create response - the post handed in is the server's.
    pub fn apply_create(&mut self, post: PostResponse) {
        self.posts.insert(0, post);
    }

    /// Replace the entry with the same id in place; no-op if absent.
    pub fn apply_update(&mut self, post: PostResponse) {
        if let Some(entry) = self.posts.iter_mut().find(|p| p.id == post.id) {
            *entry = post;
        }
    }

    /// Delete remotely first; the local entry is removed only once the
    /// remote delete has succeeded.
    pub async fn delete(
        &mut self,
        api: &impl PostApi,
        post_id: Uuid,
    ) -> Result<MessageResponse, ClientError> {
        let ack = api.delete_post(post_id).await?;
        self.posts.retain(|p| p.id != post_id);
        Ok(ack)
    }

    /// Like a post. Returns `Ok(false)` when a call for this post was
    /// already in flight and the submission was suppressed. On success the
    /// cached entry is replaced with the server's updated post; on failure
    /// the cache is unchanged.
    pub async fn like(
        &mut self,
        api: &impl PostApi,
        post_id: Uuid,
    ) -> Result<bool, ClientError> {
        self.toggle_like(api, post_id, true).await
    }

    /// Unlike a post. Same guard and reconciliation rules as [`Self::like`].
    pub async fn unlike(
        &mut self,
        api: &impl PostApi,
        post_id: Uuid,
    ) -> Result<bool, ClientError> {
        self.toggle_like(api, post_id, false).await
    }

    async fn toggle_like(
        &mut self,
        api: &impl PostApi,
        post_id: Uuid,
        like: bool,
    ) -> Result<bool, ClientError> {
        if !self.in_flight.insert(post_id) {
            return Ok(false);
        }

        let result = if like {
            api.like_post(post_id).await
        } else {
            api.unlike_post(post_id).await
        };
        self.in_flight.remove(&post_id);

        let updated = result?;
        self.apply_update(updated);
        Ok(true)
    }
}

impl Default for PostFeed {
    fn default() -> Self {
        Self::new()
    }
}
