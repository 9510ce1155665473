//! # Inkpost Shared
//!
//! Types shared between the API server and its client: request/response DTOs
//! with boundary validation, plus the error response format.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
