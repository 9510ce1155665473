//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Which post store backs this process: "postgres" or "memory".
    pub storage: &'static str,
    pub timestamp: String,
}

/// GET /api/health - liveness plus which storage mode the state builder
/// selected, so a deploy can tell an in-memory fallback from a real database.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        service: "inkpost-api",
        version: env!("CARGO_PKG_VERSION"),
        storage: if state.db.is_some() {
            "postgres"
        } else {
            "memory"
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}
