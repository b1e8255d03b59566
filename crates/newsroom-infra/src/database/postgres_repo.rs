//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use uuid::Uuid;

use newsroom_core::domain::{Author, Category, Comment, JobExecution, Post, PostFilter, User};
use newsroom_core::error::RepoError;
use newsroom_core::ports::{
    AuthorRepository, CategoryRepository, CommentRepository, JobExecutionRepository,
    PostRepository, UserRepository,
};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::job_execution::{self, Entity as JobExecutionEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};
use super::entity::subscription::{self, Entity as SubscriptionEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{map_db_err, PostgresBaseRepository};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL job execution repository.
pub type PostgresJobExecutionRepository = PostgresBaseRepository<JobExecutionEntity>;

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn contains_pattern(s: &str) -> String {
    format!("%{}%", escape_like(s))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.find('@') {
            Some(at_pos) => {
                let (local, domain) = email.split_at(at_pos);
                if local.len() > 1 {
                    format!("{}***{}", &local[..1], domain)
                } else {
                    format!("***{domain}")
                }
            }
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let result = AuthorEntity::find()
            .filter(author::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn set_rating(&self, author_id: Uuid, rating: i64) -> Result<(), RepoError> {
        let result = AuthorEntity::update_many()
            .col_expr(author::Column::Rating, Expr::value(rating))
            .filter(author::Column::Id.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn subscribers(&self, category_id: Uuid) -> Result<Vec<User>, RepoError> {
        let rows = SubscriptionEntity::find()
            .filter(subscription::Column::CategoryId.eq(category_id))
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, subscriber)| subscriber.map(Into::into))
            .collect())
    }

    async fn add_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        let membership = subscription::ActiveModel {
            category_id: Set(category_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now().into()),
        };

        // Re-subscribing is a no-op.
        SubscriptionEntity::insert(membership)
            .on_conflict(
                OnConflict::columns([
                    subscription::Column::CategoryId,
                    subscription::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn is_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let row = SubscriptionEntity::find_by_id((category_id, user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.is_some())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_author_since(
        &self,
        author_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn sum_rating_by_author(&self, author_id: Uuid) -> Result<i64, RepoError> {
        let total: Option<Option<i64>> = PostEntity::find()
            .select_only()
            .column_as(post::Column::Rating.sum(), "total")
            .filter(post::Column::AuthorId.eq(author_id))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(total.flatten().unwrap_or(0))
    }

    async fn adjust_rating(&self, post_id: Uuid, delta: i32) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::Rating,
                Expr::col(post::Column::Rating).add(delta),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn categories_of(&self, post_id: Uuid) -> Result<Vec<Category>, RepoError> {
        let rows = PostCategoryEntity::find()
            .filter(post_category::Column::PostId.eq(post_id))
            .find_also_related(CategoryEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, cat)| cat.map(Into::into))
            .collect())
    }

    async fn set_categories(&self, post_id: Uuid, category_ids: &[Uuid]) -> Result<(), RepoError> {
        PostCategoryEntity::delete_many()
            .filter(post_category::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if category_ids.is_empty() {
            return Ok(());
        }

        let memberships = category_ids.iter().map(|cid| post_category::ActiveModel {
            post_id: Set(post_id),
            category_id: Set(*cid),
        });

        PostCategoryEntity::insert_many(memberships)
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find();

        if let Some(title) = filter.title.as_deref() {
            query = query.filter(
                Expr::col((post::Entity, post::Column::Title)).ilike(contains_pattern(title)),
            );
        }

        if let Some(username) = filter.author_username.as_deref() {
            query = query
                .join(JoinType::InnerJoin, post::Relation::Author.def())
                .join(JoinType::InnerJoin, author::Relation::User.def())
                .filter(
                    Expr::col((user::Entity, user::Column::Username))
                        .ilike(contains_pattern(username)),
                );
        }

        if let Some(after) = filter.created_after {
            query = query.filter(post::Column::CreatedAt.gt(after));
        }

        let rows = query
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::CreatedAt.gte(since))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_kind(
        &self,
        kind: newsroom_core::domain::PostKind,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::Kind.eq(post::PostKind::from(kind)))
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn sum_rating_by_user(&self, user_id: Uuid) -> Result<i64, RepoError> {
        let total: Option<Option<i64>> = CommentEntity::find()
            .select_only()
            .column_as(comment::Column::Rating.sum(), "total")
            .filter(comment::Column::UserId.eq(user_id))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(total.flatten().unwrap_or(0))
    }

    async fn sum_rating_on_author_posts(&self, author_id: Uuid) -> Result<i64, RepoError> {
        let total: Option<Option<i64>> = CommentEntity::find()
            .select_only()
            .column_as(comment::Column::Rating.sum(), "total")
            .join(JoinType::InnerJoin, comment::Relation::Post.def())
            .filter(post::Column::AuthorId.eq(author_id))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(total.flatten().unwrap_or(0))
    }

    async fn adjust_rating(&self, comment_id: Uuid, delta: i32) -> Result<(), RepoError> {
        let result = CommentEntity::update_many()
            .col_expr(
                comment::Column::Rating,
                Expr::col(comment::Column::Rating).add(delta),
            )
            .filter(comment::Column::Id.eq(comment_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl JobExecutionRepository for PostgresJobExecutionRepository {
    async fn record(&self, execution: JobExecution) -> Result<(), RepoError> {
        JobExecutionEntity::insert(job_execution::ActiveModel::from(execution))
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = JobExecutionEntity::delete_many()
            .filter(job_execution::Column::FinishedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}
