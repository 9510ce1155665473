//! Schema migrations for the Inkpost database.

pub use sea_orm_migration::prelude::*;

mod m20250810_000001_create_users;
mod m20250810_000002_create_posts;
mod m20250810_000003_create_post_likes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250810_000001_create_users::Migration),
            Box::new(m20250810_000002_create_posts::Migration),
            Box::new(m20250810_000003_create_post_likes::Migration),
        ]
    }
}
