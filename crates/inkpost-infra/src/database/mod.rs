//! Database connection management and PostgreSQL repositories.

mod connections;
mod postgres_repo;

pub mod entity;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use postgres_repo::{PostgresPostRepository, PostgresUserRepository};

#[cfg(test)]
mod tests;
