//! Aggregate recompute engine
//!
//! Rebuilds a target's reaction snapshot from the reaction rows and
//! overwrites it in one write. Concurrent recomputes race; the last write wins.

use engage_core::{ReactionAggregate, Snowflake};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct AggregateService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AggregateService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Compute the snapshot for `target_id` without storing it
    pub async fn compute(&self, target_id: Snowflake) -> ServiceResult<ReactionAggregate> {
        let reactions = self.ctx.reaction_repo();
        let (by_kind, by_emoji, rating) = tokio::try_join!(
            reactions.count_by_kind(target_id),
            reactions.count_by_emoji(target_id),
            reactions.rating_stats(target_id),
        )?;

        Ok(ReactionAggregate::compose(
            by_kind,
            by_emoji.iter().map(|(emoji, count)| (emoji.as_str(), *count)),
            rating,
        ))
    }

    /// Compute and store the snapshot
    #[instrument(skip(self))]
    pub async fn recompute(&self, target_id: Snowflake) -> ServiceResult<ReactionAggregate> {
        let aggregate = self.compute(target_id).await?;

        let updated = self
            .ctx
            .target_repo()
            .update_aggregate(target_id, &aggregate)
            .await?;
        if !updated {
            return Err(ServiceError::not_found("target", target_id));
        }

        debug!(
            target_id = %target_id,
            like = aggregate.like,
            love = aggregate.love,
            rating_count = aggregate.rating_count,
            "Aggregate recomputed"
        );
        Ok(aggregate)
    }
}
