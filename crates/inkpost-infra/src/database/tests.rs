use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;

use inkpost_core::domain::Post;
use inkpost_core::ports::BaseRepository;

use crate::database::entity::{post, post_like};
use crate::database::postgres_repo::PostgresPostRepository;

#[tokio::test]
async fn test_find_post_by_id_loads_like_set() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let liker = Uuid::new_v4();
    let now = chrono::Utc::now();

    // Two queries: the post row, then its likes.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            author_id,
            title: "Test Post".to_owned(),
            content: "Content".to_owned(),
            cover_image: None,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .append_query_results(vec![vec![post_like::Model {
            post_id,
            user_id: liker,
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.author_id, author_id);
    assert_eq!(post.likes, vec![liker]);
    assert_eq!(post.likes_count(), 1);
}

#[tokio::test]
async fn test_find_missing_post_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = repo.find_by_id(Uuid::new_v4()).await.unwrap();
    assert!(result.is_none());
}
