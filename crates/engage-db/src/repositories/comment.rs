//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use engage_core::entities::{ActorKey, Comment};
use engage_core::traits::{CommentRepository, RepoResult};
use engage_core::value_objects::Snowflake;
use engage_core::DomainError;

use crate::mappers::CommentInsert;
use crate::models::CommentModel;

use super::error::{map_db_error, map_target_fk};

const COLUMNS: &str = "id, target_id, actor_key, author_id, name, email, text, text_hash, \
                       ip_hash, user_agent, risk_score, is_published, is_active, created_at, updated_at";

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self, comment), fields(comment_id = %comment.id, target_id = %comment.target_id))]
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let insert = CommentInsert::new(comment);
        let target_id = comment.target_id;

        sqlx::query(&format!(
            r#"
            INSERT INTO comments ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#
        ))
        .bind(insert.id)
        .bind(insert.target_id)
        .bind(&insert.actor_key)
        .bind(insert.author_id)
        .bind(&comment.name)
        .bind(&comment.email)
        .bind(&comment.text)
        .bind(&comment.text_hash)
        .bind(&comment.ip_hash)
        .bind(&comment.user_agent)
        .bind(comment.risk_score)
        .bind(comment.is_published)
        .bind(comment.is_active)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_target_fk(e, || DomainError::TargetNotFound(target_id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_published_by_target(
        &self,
        target_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentModel>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM comments
            WHERE target_id = $1 AND is_active AND is_published
            ORDER BY created_at DESC, id DESC
            OFFSET $2
            LIMIT $3
            "#
        ))
        .bind(target_id.into_inner())
        .bind(offset.max(0))
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count_published_by_target(&self, target_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE target_id = $1 AND is_active AND is_published",
        )
        .bind(target_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, actor))]
    async fn find_latest_by_actor(
        &self,
        actor: &ActorKey,
        target_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentModel>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM comments
            WHERE actor_key = $1 AND target_id = $2 AND created_at >= $3
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(actor.to_string())
        .bind(target_id.into_inner())
        .bind(since)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Comment::try_from).transpose()
    }
}
