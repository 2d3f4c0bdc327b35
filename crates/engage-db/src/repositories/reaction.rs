//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use engage_core::entities::{ActorKey, RatingStats, Reaction, ReactionKey, ReactionKind};
use engage_core::traits::{ReactionGroupCount, ReactionRepository, RepoResult};
use engage_core::value_objects::Snowflake;
use engage_core::DomainError;

use crate::mappers::{parse_kind, ReactionInsert};
use crate::models::{
    EmojiCountModel, GroupCountModel, KindCountModel, RatingStatsModel, ReactionModel,
};

use super::error::{is_unique_violation, map_db_error, map_target_fk};

const COLUMNS: &str =
    "actor_key, target_id, kind, emoji, value, is_active, created_at, updated_at";

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self, key), fields(target_id = %key.target_id, kind = %key.kind))]
    async fn find(&self, key: &ReactionKey) -> RepoResult<Option<Reaction>> {
        let row = sqlx::query_as::<_, ReactionModel>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM reactions
            WHERE actor_key = $1 AND target_id = $2 AND kind = $3
              AND COALESCE(emoji, '') = COALESCE($4, '')
              AND is_active
            "#
        ))
        .bind(key.actor.to_string())
        .bind(key.target_id.into_inner())
        .bind(key.kind.as_str())
        .bind(key.emoji.as_ref().map(|e| e.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Reaction::try_from).transpose()
    }

    #[instrument(skip(self, reaction), fields(target_id = %reaction.target_id, kind = %reaction.kind()))]
    async fn create(&self, reaction: &Reaction) -> RepoResult<bool> {
        let insert = ReactionInsert::new(reaction);
        let target_id = reaction.target_id;

        let result = sqlx::query(
            r#"
            INSERT INTO reactions (actor_key, target_id, kind, emoji, value, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
            ON CONFLICT (actor_key, target_id, kind, (COALESCE(emoji, ''))) DO NOTHING
            "#,
        )
        .bind(&insert.actor_key)
        .bind(insert.target_id)
        .bind(insert.kind)
        .bind(insert.emoji)
        .bind(insert.value)
        .bind(reaction.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            // a racing insert that slipped past ON CONFLICT still means "already on"
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(map_target_fk(e, || DomainError::TargetNotFound(target_id))),
        }
    }

    #[instrument(skip(self, key), fields(target_id = %key.target_id, kind = %key.kind))]
    async fn delete(&self, key: &ReactionKey) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE actor_key = $1 AND target_id = $2 AND kind = $3
              AND COALESCE(emoji, '') = COALESCE($4, '')
            "#,
        )
        .bind(key.actor.to_string())
        .bind(key.target_id.into_inner())
        .bind(key.kind.as_str())
        .bind(key.emoji.as_ref().map(|e| e.as_str()))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, reaction), fields(target_id = %reaction.target_id))]
    async fn upsert_rating(&self, reaction: &Reaction) -> RepoResult<()> {
        let insert = ReactionInsert::new(reaction);
        if insert.value.is_none() {
            return Err(DomainError::InternalError("upsert_rating without a value".into()));
        }
        let target_id = reaction.target_id;

        sqlx::query(
            r#"
            INSERT INTO reactions (actor_key, target_id, kind, emoji, value, is_active, created_at, updated_at)
            VALUES ($1, $2, 'RATING', NULL, $3, TRUE, $4, $4)
            ON CONFLICT (actor_key, target_id, kind, (COALESCE(emoji, '')))
            DO UPDATE SET value = EXCLUDED.value, is_active = TRUE, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&insert.actor_key)
        .bind(insert.target_id)
        .bind(insert.value)
        .bind(reaction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_target_fk(e, || DomainError::TargetNotFound(target_id)))?;

        Ok(())
    }

    #[instrument(skip(self, targets))]
    async fn find_by_actor(
        &self,
        actor: &ActorKey,
        targets: Option<&[Snowflake]>,
    ) -> RepoResult<Vec<Reaction>> {
        let target_ids: Option<Vec<i64>> =
            targets.map(|ids| ids.iter().map(|id| id.into_inner()).collect());

        let rows = sqlx::query_as::<_, ReactionModel>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM reactions
            WHERE actor_key = $1 AND is_active
              AND ($2::BIGINT[] IS NULL OR target_id = ANY($2))
            ORDER BY created_at DESC
            "#
        ))
        .bind(actor.to_string())
        .bind(target_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Reaction::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count_by_kind(&self, target_id: Snowflake) -> RepoResult<Vec<(ReactionKind, i64)>> {
        let rows = sqlx::query_as::<_, KindCountModel>(
            r#"
            SELECT kind, COUNT(*) AS count
            FROM reactions
            WHERE target_id = $1 AND is_active
            GROUP BY kind
            "#,
        )
        .bind(target_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter()
            .map(|r| parse_kind(&r.kind).map(|kind| (kind, r.count)))
            .collect()
    }

    #[instrument(skip(self))]
    async fn count_by_emoji(&self, target_id: Snowflake) -> RepoResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, EmojiCountModel>(
            r#"
            SELECT emoji, COUNT(*) AS count
            FROM reactions
            WHERE target_id = $1 AND kind = 'EMOJI' AND emoji IS NOT NULL AND is_active
            GROUP BY emoji
            ORDER BY count DESC
            "#,
        )
        .bind(target_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|r| (r.emoji, r.count)).collect())
    }

    #[instrument(skip(self))]
    async fn rating_stats(&self, target_id: Snowflake) -> RepoResult<RatingStats> {
        let row = sqlx::query_as::<_, RatingStatsModel>(
            r#"
            SELECT AVG(value)::DOUBLE PRECISION AS avg, COUNT(*) AS count
            FROM reactions
            WHERE target_id = $1 AND kind = 'RATING' AND value IS NOT NULL AND is_active
            "#,
        )
        .bind(target_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(RatingStats {
            avg: row.avg,
            count: row.count,
        })
    }

    #[instrument(skip(self, target_ids), fields(targets = target_ids.len()))]
    async fn count_grouped(&self, target_ids: &[Snowflake]) -> RepoResult<Vec<ReactionGroupCount>> {
        if target_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = target_ids.iter().map(|id| id.into_inner()).collect();

        let rows = sqlx::query_as::<_, GroupCountModel>(
            r#"
            SELECT target_id, kind, emoji, COUNT(*) AS count
            FROM reactions
            WHERE target_id = ANY($1) AND is_active
            GROUP BY target_id, kind, emoji
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(ReactionGroupCount::try_from).collect()
    }
}
