use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a single authored blog entry.
///
/// `author_id` is fixed at creation from the authenticated caller and is
/// never reassignable. `likes` carries set semantics: each user id appears
/// at most once, and the like count is always derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to a post. Absent fields are retained.
///
/// There is deliberately no `author_id` field here - authorship cannot be
/// changed through any update path.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
}

impl Post {
    /// Create a new post authored by `author_id`.
    pub fn new(
        author_id: Uuid,
        title: String,
        content: String,
        cover_image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            content,
            cover_image,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived like count.
    pub fn likes_count(&self) -> usize {
        self.likes.len()
    }

    /// Whether `user_id` is in the like set.
    pub fn liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    /// Add `user_id` to the like set. Returns `false` when already present
    /// (membership is unchanged, the count does not double-increment).
    pub fn add_like(&mut self, user_id: Uuid) -> bool {
        if self.likes.contains(&user_id) {
            return false;
        }
        self.likes.push(user_id);
        true
    }

    /// Remove `user_id` from the like set. Returns `false` when it was not
    /// present; the count never goes below zero.
    pub fn remove_like(&mut self, user_id: Uuid) -> bool {
        let before = self.likes.len();
        self.likes.retain(|id| *id != user_id);
        self.likes.len() != before
    }

    /// Apply a partial update. Fields absent from the patch are retained.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(cover_image) = patch.cover_image {
            self.cover_image = Some(cover_image);
        }
        self.updated_at = Utc::now();
    }
}
