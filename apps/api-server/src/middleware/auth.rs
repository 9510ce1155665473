//! Authentication middleware and extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};
use std::future::{Ready, ready};
use std::sync::Arc;

use inkpost_core::ports::{AuthError, TokenClaims, TokenService};

/// Cookie carrying the identity token, mirrored by the bearer header.
pub const TOKEN_COOKIE: &str = "access_token";

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
///
/// The token is read from the `access_token` cookie first, then from the
/// `Authorization: Bearer` header. A missing token is a 401; a token that is
/// present but invalid or expired is a 403.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::MissingAuth => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => actix_web::http::StatusCode::FORBIDDEN,
            AuthError::InvalidToken(_) => actix_web::http::StatusCode::FORBIDDEN,
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use inkpost_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("You are not authenticated!"),
            AuthError::TokenExpired => ErrorResponse::new(403, "Token Expired")
                .with_detail("Your identity token has expired. Please login again."),
            AuthError::InvalidToken(_) => {
                ErrorResponse::new(403, "Invalid Token").with_detail("Token is not valid!")
            }
            _ => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

fn extract_token(req: &HttpRequest) -> Option<String> {
    // Cookie first, then Authorization header.
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    let auth_str = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(str::to_string)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Get token service from app data
        let token_service = match req.app_data::<actix_web::web::Data<Arc<dyn TokenService>>>() {
            Some(service) => service,
            None => {
                tracing::error!("TokenService not found in app data");
                return ready(Err(AuthenticationError(AuthError::InvalidToken(
                    "Server configuration error".to_string(),
                ))));
            }
        };

        let token = match extract_token(req) {
            Some(t) => t,
            None => return ready(Err(AuthenticationError(AuthError::MissingAuth))),
        };

        match token_service.validate_token(&token) {
            Ok(claims) => ready(Ok(Identity::from(claims))),
            Err(e) => ready(Err(AuthenticationError(e))),
        }
    }
}
