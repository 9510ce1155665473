//! # Inkpost Client
//!
//! Consumer side of the Inkpost API: a typed HTTP client plus the
//! [`PostFeed`] cache that view code renders from. The feed applies
//! mutations optimistically but only ever after the server has accepted
//! them, and reconciles like counts from the server's responses.

pub mod api;
pub mod feed;

pub use api::{ClientError, HttpPostApi, PostApi};
pub use feed::{FeedStatus, PostFeed};
