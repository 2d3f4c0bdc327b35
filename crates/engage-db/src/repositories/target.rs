//! PostgreSQL implementation of TargetRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use engage_core::entities::{ReactionAggregate, Target};
use engage_core::traits::{RepoResult, TargetRepository};
use engage_core::value_objects::Snowflake;

use crate::models::TargetModel;

use super::error::map_db_error;

/// PostgreSQL implementation of TargetRepository
#[derive(Clone)]
pub struct PgTargetRepository {
    pool: PgPool,
}

impl PgTargetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TargetRepository for PgTargetRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Target>> {
        let row = sqlx::query_as::<_, TargetModel>(
            r#"
            SELECT id, title, agg_like, agg_love, agg_yum, agg_wow, rating_avg, rating_count,
                   comment_count, created_at, updated_at
            FROM targets
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Target::from))
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM targets WHERE id = $1)")
            .bind(id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, target), fields(target_id = %target.id))]
    async fn create(&self, target: &Target) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO targets (id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(target.id.into_inner())
        .bind(&target.title)
        .bind(target.created_at)
        .bind(target.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, aggregate))]
    async fn update_aggregate(
        &self,
        id: Snowflake,
        aggregate: &ReactionAggregate,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE targets
            SET agg_like = $2, agg_love = $3, agg_yum = $4, agg_wow = $5,
                rating_avg = $6, rating_count = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .bind(aggregate.like)
        .bind(aggregate.love)
        .bind(aggregate.yum)
        .bind(aggregate.wow)
        .bind(aggregate.rating_avg)
        .bind(aggregate.rating_count)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn increment_comment_count(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE targets SET comment_count = comment_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_ids(&self, after: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM targets
            WHERE id > $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(after.map_or(0, Snowflake::into_inner))
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }

    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
