//! SeaORM entities mapping the domain to the relational schema.

pub mod post;
pub mod post_like;
pub mod user;
