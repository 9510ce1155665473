//! Typed HTTP client for the Inkpost API.
//!
//! [`PostApi`] is the seam the feed cache depends on; [`HttpPostApi`] is the
//! reqwest-backed implementation. Error bodies are RFC 7807 and their
//! `detail` is surfaced to the caller as-is.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use inkpost_shared::ErrorResponse;
use inkpost_shared::dto::{
    AuthResponse, AuthorResponse, CreatePostRequest, LoginRequest, MessageResponse, PostResponse,
    RegisterRequest, UpdatePostRequest,
};

/// Client-side error taxonomy, mirroring the server's status classes.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Not authenticated")]
    Unauthenticated,

    /// The stored identity token was rejected; local session state has been
    /// cleared and the user must re-authenticate.
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The post operations the feed cache needs from the service.
#[async_trait]
pub trait PostApi: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<PostResponse>, ClientError>;
    async fn my_posts(&self) -> Result<Vec<PostResponse>, ClientError>;
    async fn get_post(&self, id: Uuid) -> Result<PostResponse, ClientError>;
    async fn create_post(&self, req: &CreatePostRequest) -> Result<PostResponse, ClientError>;
    async fn update_post(
        &self,
        id: Uuid,
        req: &UpdatePostRequest,
    ) -> Result<PostResponse, ClientError>;
    async fn delete_post(&self, id: Uuid) -> Result<MessageResponse, ClientError>;
    async fn like_post(&self, id: Uuid) -> Result<PostResponse, ClientError>;
    async fn unlike_post(&self, id: Uuid) -> Result<PostResponse, ClientError>;
}

/// HTTP implementation of [`PostApi`] plus the account endpoints.
///
/// Holds the identity token; a rejected token clears it, after which the
/// caller is expected to route the user back to login.
pub struct HttpPostApi {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpPostApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: RwLock::new(None),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("token lock poisoned") = Some(token.into());
    }

    pub fn has_session(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    /// Drop the stored identity token.
    pub fn clear_session(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    /// Register a new account and store the returned token.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let auth: AuthResponse = self
            .request(Method::POST, "/api/auth/register", Some(req))
            .await?;
        self.set_token(auth.access_token.clone());
        Ok(auth)
    }

    /// Login and store the returned token.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let auth: AuthResponse = self
            .request(Method::POST, "/api/auth/login", Some(req))
            .await?;
        self.set_token(auth.access_token.clone());
        Ok(auth)
    }

    /// The authenticated caller's public profile.
    pub async fn me(&self) -> Result<AuthorResponse, ClientError> {
        self.request::<(), _>(Method::GET, "/api/auth/me", None)
            .await
    }

    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);

        if let Some(token) = self.token.read().expect("token lock poisoned").as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let problem: ErrorResponse = response.json().await.unwrap_or_else(|_| {
            ErrorResponse::new(status.as_u16(), status.canonical_reason().unwrap_or("Error"))
        });
        tracing::debug!(%url, status = status.as_u16(), message = problem.message(), "API error");

        Err(self.map_error(status, problem))
    }

    fn map_error(&self, status: StatusCode, problem: ErrorResponse) -> ClientError {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(problem.message().to_string())
            }
            StatusCode::UNAUTHORIZED => ClientError::Unauthenticated,
            StatusCode::FORBIDDEN if is_token_problem(&problem) => {
                // The token we hold is no longer good - drop it so the view
                // layer sends the user back to login.
                self.clear_session();
                ClientError::SessionExpired
            }
            StatusCode::FORBIDDEN => ClientError::Forbidden(problem.message().to_string()),
            StatusCode::NOT_FOUND => ClientError::NotFound(problem.message().to_string()),
            StatusCode::CONFLICT => ClientError::Conflict(problem.message().to_string()),
            _ => ClientError::Server(problem.message().to_string()),
        }
    }
}

fn is_token_problem(problem: &ErrorResponse) -> bool {
    matches!(problem.title.as_str(), "Token Expired" | "Invalid Token")
}

#[async_trait]
impl PostApi for HttpPostApi {
    async fn list_posts(&self) -> Result<Vec<PostResponse>, ClientError> {
        self.request::<(), _>(Method::GET, "/api/posts", None).await
    }

    async fn my_posts(&self) -> Result<Vec<PostResponse>, ClientError> {
        self.request::<(), _>(Method::GET, "/api/posts/mine", None)
            .await
    }

    async fn get_post(&self, id: Uuid) -> Result<PostResponse, ClientError> {
        self.request::<(), _>(Method::GET, &format!("/api/posts/{id}"), None)
            .await
    }

    async fn create_post(&self, req: &CreatePostRequest) -> Result<PostResponse, ClientError> {
        self.request(Method::POST, "/api/posts", Some(req)).await
    }

    async fn update_post(
        &self,
        id: Uuid,
        req: &UpdatePostRequest,
    ) -> Result<PostResponse, ClientError> {
        self.request(Method::PUT, &format!("/api/posts/{id}"), Some(req))
            .await
    }

    async fn delete_post(&self, id: Uuid) -> Result<MessageResponse, ClientError> {
        self.request::<(), _>(Method::DELETE, &format!("/api/posts/{id}"), None)
            .await
    }

    async fn like_post(&self, id: Uuid) -> Result<PostResponse, ClientError> {
        self.request::<(), _>(Method::PUT, &format!("/api/posts/{id}/like"), None)
            .await
    }

    async fn unlike_post(&self, id: Uuid) -> Result<PostResponse, ClientError> {
        self.request::<(), _>(Method::PUT, &format!("/api/posts/{id}/unlike"), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_rejection_clears_the_session() {
        let api = HttpPostApi::new("http://localhost:8080");
        api.set_token("stale");
        assert!(api.has_session());

        let err = api.map_error(
            StatusCode::FORBIDDEN,
            ErrorResponse::new(403, "Token Expired"),
        );

        assert!(matches!(err, ClientError::SessionExpired));
        assert!(!api.has_session());
    }

    #[test]
    fn ownership_forbidden_keeps_the_session() {
        let api = HttpPostApi::new("http://localhost:8080");
        api.set_token("good");

        let err = api.map_error(
            StatusCode::FORBIDDEN,
            ErrorResponse::forbidden().with_detail("You can update only your posts!"),
        );

        assert!(matches!(err, ClientError::Forbidden(_)));
        assert!(api.has_session());
    }
}
