//! Data Transfer Objects - request/response types for the API.
//!
//! Requests are validated here, at the service boundary, before anything
//! touches the post store. Wire field names are camelCase to match the
//! public API (`coverImage`, `likesCount`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use inkpost_core::domain::{Post, PostPatch, User};

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Validate registration input. Returns all problems, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.username.trim().len() < 3 {
            errors.push("Username must be at least 3 characters.".to_string());
        }
        if !is_plausible_email(&self.email) {
            errors.push("Invalid email format.".to_string());
        }
        if self.password.len() < 8 {
            errors.push("Password must be at least 8 characters.".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing an identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// A user's public fields - everything except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AuthorResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Title is required.".to_string());
        }
        if self.content.trim().is_empty() {
            errors.push("Content is required.".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Partial update to a post. Absent fields are retained server-side.
///
/// Authorship is not part of this type: there is no field a caller could
/// set to reassign a post to another user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl UpdatePostRequest {
    /// Supplied fields must be non-empty; absent fields are fine.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                errors.push("Title cannot be empty.".to_string());
            }
        }
        if let Some(content) = &self.content {
            if content.trim().is_empty() {
                errors.push("Content cannot be empty.".to_string());
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl From<UpdatePostRequest> for PostPatch {
    fn from(req: UpdatePostRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            cover_image: req.cover_image,
        }
    }
}

/// A post with its author resolved to public fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub author: AuthorResponse,
    pub likes: Vec<Uuid>,
    pub likes_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn resolve(post: Post, author: User) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            cover_image: post.cover_image,
            author: author.into(),
            likes_count: post.likes.len(),
            likes: post.likes,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    /// Whether `user_id` is in the like set.
    pub fn liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }
}

/// Confirmation message for delete and similar acknowledgments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_short_username_and_password() {
        let req = RegisterRequest {
            username: "ab".into(),
            email: "not-an-email".into(),
            password: "short".into(),
        };

        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn register_accepts_valid_input() {
        let req = RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "correct horse".into(),
        };

        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_requires_title_and_content() {
        let req = CreatePostRequest {
            title: "  ".into(),
            content: String::new(),
            cover_image: None,
        };

        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn update_allows_absent_fields_but_not_empty_ones() {
        assert!(UpdatePostRequest::default().validate().is_ok());

        let req = UpdatePostRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn post_response_uses_camel_case_wire_names() {
        let author = User::new(
            "alice".into(),
            "alice@example.com".into(),
            "hash".into(),
        );
        let post = Post::new(author.id, "T".into(), "C".into(), Some("u".into()));
        let json = serde_json::to_value(PostResponse::resolve(post, author)).unwrap();

        assert!(json.get("coverImage").is_some());
        assert!(json.get("likesCount").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("author").unwrap().get("password").is_none());
    }
}
