//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use inkpost_core::domain::{Post, User};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as LikeEntity};
use super::entity::user::{self, Entity as UserEntity};

fn map_db_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = entity.into();

        let model = UserEntity::insert(active)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([
                        user::Column::Username,
                        user::Column::Email,
                        user::Column::PasswordHash,
                        user::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

/// PostgreSQL post repository.
///
/// Likes live in the `post_likes` table; `add_like`/`remove_like` are single
/// statements against that table, so concurrent likes from different users
/// cannot lose each other to a read-then-write race.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn load_likes(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let rows = LikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(|l| l.user_id).collect())
    }

    async fn assemble(&self, rows: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        let ids: Vec<Uuid> = rows.iter().map(|m| m.id).collect();

        let likes = LikeEntity::find()
            .filter(post_like::Column::PostId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let mut by_post: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for like in likes {
            by_post.entry(like.post_id).or_default().push(like.user_id);
        }

        Ok(rows
            .into_iter()
            .map(|m| {
                let likes = by_post.remove(&m.id).unwrap_or_default();
                m.into_domain(likes)
            })
            .collect())
    }

    async fn require(&self, post_id: Uuid) -> Result<Post, RepoError> {
        self.find_by_id(post_id).await?.ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        match result {
            Some(model) => {
                let likes = self.load_likes(model.id).await?;
                Ok(Some(model.into_domain(likes)))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let likes = entity.likes.clone();
        let active: post::ActiveModel = entity.into();

        let model = PostEntity::insert(active)
            .on_conflict(
                OnConflict::column(post::Column::Id)
                    .update_columns([
                        post::Column::Title,
                        post::Column::Content,
                        post::Column::CoverImage,
                        post::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into_domain(likes))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        self.assemble(rows).await
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        self.assemble(rows).await
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError> {
        let like = post_like::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
        };

        let insert = LikeEntity::insert(like)
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match insert {
            Ok(_) => {}
            // Conflict means the user already liked this post - set semantics.
            Err(DbErr::RecordNotInserted) => {}
            Err(e) if e.to_string().contains("foreign key") => return Err(RepoError::NotFound),
            Err(e) => return Err(RepoError::Query(e.to_string())),
        }

        self.require(post_id).await
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError> {
        LikeEntity::delete_by_id((post_id, user_id))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        self.require(post_id).await
    }
}
