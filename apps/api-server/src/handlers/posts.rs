//! Post handlers - the post lifecycle and its ownership rules.
//!
//! Authorship is fixed at creation from the authenticated caller; every
//! mutating operation re-checks ownership server-side against the stored
//! post, never against anything the client sent.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkpost_core::domain::Post;
use inkpost_core::error::RepoError;
use inkpost_shared::dto::{CreatePostRequest, MessageResponse, PostResponse, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn resolve_author(state: &AppState, post: Post) -> AppResult<PostResponse> {
    let author = state
        .users
        .find_by_id(post.author_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Author {} missing for post", post.author_id)))?;

    Ok(PostResponse::resolve(post, author))
}

async fn resolve_authors(state: &AppState, posts: Vec<Post>) -> AppResult<Vec<PostResponse>> {
    // One lookup per distinct author
    let mut authors = HashMap::new();
    let mut resolved = Vec::with_capacity(posts.len());

    for post in posts {
        if !authors.contains_key(&post.author_id) {
            let author = state
                .users
                .find_by_id(post.author_id)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("Author {} missing for post", post.author_id))
                })?;
            authors.insert(post.author_id, author);
        }
        let author = authors[&post.author_id].clone();
        resolved.push(PostResponse::resolve(post, author));
    }

    Ok(resolved)
}

async fn owned_post(state: &AppState, post_id: Uuid, caller: &Identity) -> AppResult<Post> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found!".to_string()))?;

    if post.author_id != caller.user_id {
        return Err(AppError::Forbidden(
            "You can modify only your posts!".to_string(),
        ));
    }

    Ok(post)
}

fn like_error(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound => AppError::NotFound("Post not found!".to_string()),
        other => other.into(),
    }
}

/// POST /api/posts (auth required)
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate().map_err(AppError::Validation)?;

    let post = Post::new(identity.user_id, req.title, req.content, req.cover_image);
    let saved = state.posts.save(post).await?;
    tracing::info!(post_id = %saved.id, author = %identity.username, "Post created");

    Ok(HttpResponse::Created().json(resolve_author(&state, saved).await?))
}

/// PUT /api/posts/{id} (auth required, owner only)
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate().map_err(AppError::Validation)?;

    let mut post = owned_post(&state, path.into_inner(), &identity).await?;
    post.apply(req.into());
    let saved = state.posts.save(post).await?;

    Ok(HttpResponse::Ok().json(resolve_author(&state, saved).await?))
}

/// DELETE /api/posts/{id} (auth required, owner only)
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = owned_post(&state, path.into_inner(), &identity).await?;

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, author = %identity.username, "Post deleted");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post has been deleted.".to_string(),
    }))
}

/// GET /api/posts/{id} (public)
pub async fn get_post(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found!".to_string()))?;

    Ok(HttpResponse::Ok().json(resolve_author(&state, post).await?))
}

/// GET /api/posts (public) - all posts, newest first
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all().await?;
    Ok(HttpResponse::Ok().json(resolve_authors(&state, posts).await?))
}

/// GET /api/posts/mine (auth required) - caller's posts, newest first
pub async fn my_posts(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.posts.find_by_author(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(resolve_authors(&state, posts).await?))
}

/// PUT /api/posts/{id}/like (auth required)
pub async fn like_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .add_like(path.into_inner(), identity.user_id)
        .await
        .map_err(like_error)?;

    Ok(HttpResponse::Ok().json(resolve_author(&state, post).await?))
}

/// PUT /api/posts/{id}/unlike (auth required)
pub async fn unlike_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .remove_like(path.into_inner(), identity.user_id)
        .await
        .map_err(like_error)?;

    Ok(HttpResponse::Ok().json(resolve_author(&state, post).await?))
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::Arc;

    use actix_http::Request;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::{App, body::MessageBody, cookie::Cookie, test, web};
    use serde_json::json;

    use inkpost_core::ports::{PasswordService, TokenService};
    use inkpost_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use inkpost_infra::memory::{InMemoryPostRepository, InMemoryUserRepository};
    use inkpost_shared::dto::{AuthResponse, MessageResponse, PostResponse};

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    trait TestApp:
        Service<Request, Response = ServiceResponse<Self::Body>, Error = actix_web::Error>
    {
        type Body: MessageBody<Error = Self::BodyError>;
        type BodyError: fmt::Debug;
    }

    impl<S, B> TestApp for S
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
        B::Error: fmt::Debug,
    {
        type Body = B;
        type BodyError = B::Error;
    }

    fn test_state() -> AppState {
        AppState {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            db: None,
        }
    }

    async fn test_app(state: AppState) -> impl TestApp {
        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }));
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(token_service))
                .app_data(web::Data::new(password_service))
                .configure(configure_routes),
        )
        .await
    }

    async fn register(app: &impl TestApp, username: &str) -> String {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "correct horse battery",
            }))
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), 201);

        let auth: AuthResponse = test::read_body_json(resp).await;
        auth.access_token
    }

    async fn create_post(
        app: &impl TestApp,
        token: &str,
        title: &str,
        content: &str,
    ) -> PostResponse {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "title": title, "content": content }))
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), 201);

        test::read_body_json(resp).await
    }

    #[actix_web::test]
    async fn post_lifecycle_scenario() {
        let app = test_app(test_state()).await;
        let token_a = register(&app, "alice").await;
        let token_b = register(&app, "bob").await;

        // Create as A, then read it back publicly
        let created = create_post(&app, &token_a, "T", "C").await;
        assert_eq!(created.author.username, "alice");
        assert_eq!(created.likes_count, 0);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", created.id))
            .to_request();
        let fetched: PostResponse = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(fetched.title, "T");
        assert_eq!(fetched.author.id, created.author.id);

        // Partial update as A: title changes, content retained
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", created.id))
            .insert_header(("Authorization", format!("Bearer {token_a}")))
            .set_json(json!({ "title": "T2" }))
            .to_request();
        let updated: PostResponse = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(updated.title, "T2");
        assert_eq!(updated.content, "C");

        // Update as B is forbidden
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", created.id))
            .insert_header(("Authorization", format!("Bearer {token_b}")))
            .set_json(json!({ "title": "hijack" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        // Like twice as B: count stays at 1
        for _ in 0..2 {
            let req = test::TestRequest::put()
                .uri(&format!("/api/posts/{}/like", created.id))
                .insert_header(("Authorization", format!("Bearer {token_b}")))
                .to_request();
            let liked: PostResponse = test::read_body_json(test::call_service(&app, req).await).await;
            assert_eq!(liked.likes_count, 1);
        }

        // Unlike as B: back to zero
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}/unlike", created.id))
            .insert_header(("Authorization", format!("Bearer {token_b}")))
            .to_request();
        let unliked: PostResponse = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(unliked.likes_count, 0);

        // Delete as B forbidden, as A succeeds, then the post is gone
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", created.id))
            .insert_header(("Authorization", format!("Bearer {token_b}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", created.id))
            .insert_header(("Authorization", format!("Bearer {token_a}")))
            .to_request();
        let ack: MessageResponse = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(ack.message, "Post has been deleted.");

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", created.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn create_requires_authentication() {
        let app = test_app(test_state()).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "title": "T", "content": "C" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }

    #[actix_web::test]
    async fn garbled_token_is_forbidden() {
        let app = test_app(test_state()).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .set_json(json!({ "title": "T", "content": "C" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);
    }

    #[actix_web::test]
    async fn token_is_accepted_from_a_cookie() {
        let app = test_app(test_state()).await;
        let token = register(&app, "alice").await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .cookie(Cookie::new("access_token", token))
            .set_json(json!({ "title": "T", "content": "C" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    #[actix_web::test]
    async fn create_rejects_empty_title_and_content() {
        let app = test_app(test_state()).await;
        let token = register(&app, "alice").await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "title": "", "content": "" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn update_rejects_empty_supplied_fields() {
        let app = test_app(test_state()).await;
        let token = register(&app, "alice").await;
        let created = create_post(&app, &token, "T", "C").await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", created.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "content": "" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn authorship_cannot_be_reassigned_through_update() {
        let app = test_app(test_state()).await;
        let token = register(&app, "alice").await;
        let created = create_post(&app, &token, "T", "C").await;

        // A stray author field in the body is ignored by the input schema
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", created.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "title": "T2", "author": uuid::Uuid::new_v4() }))
            .to_request();
        let updated: PostResponse = test::read_body_json(test::call_service(&app, req).await).await;

        assert_eq!(updated.author.id, created.author.id);
    }

    #[actix_web::test]
    async fn update_of_missing_post_is_not_found() {
        let app = test_app(test_state()).await;
        let token = register(&app, "alice").await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "title": "T" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn list_returns_posts_newest_first() {
        let app = test_app(test_state()).await;
        let token = register(&app, "alice").await;

        create_post(&app, &token, "first", "C").await;
        create_post(&app, &token, "second", "C").await;

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let posts: Vec<PostResponse> = test::read_body_json(test::call_service(&app, req).await).await;

        assert_eq!(posts.len(), 2);
        assert!(
            posts
                .windows(2)
                .all(|w| w[0].created_at >= w[1].created_at)
        );
    }

    #[actix_web::test]
    async fn mine_lists_only_the_callers_posts() {
        let app = test_app(test_state()).await;
        let token_a = register(&app, "alice").await;
        let token_b = register(&app, "bob").await;

        create_post(&app, &token_a, "alice's", "C").await;
        create_post(&app, &token_b, "bob's", "C").await;

        let req = test::TestRequest::get()
            .uri("/api/posts/mine")
            .insert_header(("Authorization", format!("Bearer {token_a}")))
            .to_request();
        let mine: Vec<PostResponse> = test::read_body_json(test::call_service(&app, req).await).await;

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "alice's");
    }

    #[actix_web::test]
    async fn like_on_missing_post_is_not_found() {
        let app = test_app(test_state()).await;
        let token = register(&app, "alice").await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}/like", uuid::Uuid::new_v4()))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let app = test_app(test_state()).await;
        register(&app, "alice").await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "correct horse battery",
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);
    }

    #[actix_web::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let app = test_app(test_state()).await;
        register(&app, "alice").await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "email": "alice@example.com",
                "password": "wrong password!",
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }

    #[actix_web::test]
    async fn health_reports_service_and_storage_mode() {
        let app = test_app(test_state()).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["service"], "inkpost-api");
        assert_eq!(body["storage"], "memory");
    }

    #[actix_web::test]
    async fn me_returns_public_profile_without_password_hash() {
        let app = test_app(test_state()).await;
        let token = register(&app, "alice").await;

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["username"], "alice");
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());
    }
}
