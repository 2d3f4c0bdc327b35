//! Reaction service
//!
//! Toggle, idempotent set and rate write one reaction row and then recompute
//! the target's aggregate before returning. Summary and "my reactions" are reads.

use std::collections::BTreeMap;
use std::str::FromStr;

use engage_core::entities::{Actor, Reaction, ReactionKind, Stance};
use engage_core::{ReactionAggregate, RatingValue, Snowflake};
use tracing::{info, instrument};

use crate::dto::{
    parse_target_id, parse_target_ids, MyReactionResponse, MyReactionsQuery, RateRequest,
    SetReactionRequest, SummaryQuery, SummaryResponse, TargetSummary, ToggleReactionRequest,
};

use super::aggregate::AggregateService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Outcome of toggle / set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionOutcome {
    /// Whether the reaction exists after the call
    pub on: bool,
    /// Whether this call inserted the row
    pub created: bool,
    pub aggregate: ReactionAggregate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingOutcome {
    pub value: RatingValue,
    pub aggregate: ReactionAggregate,
}

/// Nesting of a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Breakdown {
    #[default]
    None,
    Kind,
    Emoji,
    KindEmoji,
}

impl Breakdown {
    fn by_kind(self) -> bool {
        matches!(self, Self::Kind | Self::KindEmoji)
    }

    fn by_emoji(self) -> bool {
        matches!(self, Self::Emoji | Self::KindEmoji)
    }
}

impl FromStr for Breakdown {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `+` arrives as a space once the query string is decoded
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "kind" => Ok(Self::Kind),
            "emoji" => Ok(Self::Emoji),
            "kind+emoji" | "kind emoji" | "kind,emoji" | "all" => Ok(Self::KindEmoji),
            _ => Err(ServiceError::validation("invalid_breakdown")),
        }
    }
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Flip the caller's reaction of one kind (and emoji) on a target
    #[instrument(skip(self, request), fields(actor = %actor.key()))]
    pub async fn toggle(
        &self,
        actor: &Actor,
        request: &ToggleReactionRequest,
    ) -> ServiceResult<ReactionOutcome> {
        let target_id = request.target()?;
        let kind = request.kind.parse::<ReactionKind>()?;
        let stance = Stance::toggleable(kind, request.emoji.as_deref())?;
        self.ensure_target(target_id).await?;

        let reaction = Reaction::new(actor.key(), target_id, stance, self.ctx.clock().now());
        let key = reaction.key();

        let (on, created) = match self.ctx.reaction_repo().find(&key).await? {
            Some(_) => {
                self.ctx.reaction_repo().delete(&key).await?;
                (false, false)
            }
            None => {
                // a racing insert loses to the unique index and reads as "already on"
                let created = self.ctx.reaction_repo().create(&reaction).await?;
                (true, created)
            }
        };

        let aggregate = AggregateService::new(self.ctx).recompute(target_id).await?;
        info!(target_id = %target_id, kind = %key.kind, on, "Reaction toggled");

        Ok(ReactionOutcome {
            on,
            created,
            aggregate,
        })
    }

    /// Make the reaction's existence match `on`
    #[instrument(skip(self, request), fields(actor = %actor.key()))]
    pub async fn set(
        &self,
        actor: &Actor,
        request: &SetReactionRequest,
    ) -> ServiceResult<ReactionOutcome> {
        let target_id = request.target()?;
        let kind = request.kind.parse::<ReactionKind>()?;
        let stance = Stance::toggleable(kind, request.emoji.as_deref())?;
        self.ensure_target(target_id).await?;

        let reaction = Reaction::new(actor.key(), target_id, stance, self.ctx.clock().now());
        let key = reaction.key();
        let existing = self.ctx.reaction_repo().find(&key).await?;

        let created = match (request.on, existing) {
            (true, None) => self.ctx.reaction_repo().create(&reaction).await?,
            (false, Some(_)) => {
                self.ctx.reaction_repo().delete(&key).await?;
                false
            }
            _ => false,
        };

        let aggregate = AggregateService::new(self.ctx).recompute(target_id).await?;
        info!(
            target_id = %target_id,
            kind = %key.kind,
            on = request.on,
            created,
            "Reaction set"
        );

        Ok(ReactionOutcome {
            on: request.on,
            created,
            aggregate,
        })
    }

    /// Create or overwrite the caller's single RATING row
    #[instrument(skip(self, request), fields(actor = %actor.key()))]
    pub async fn rate(&self, actor: &Actor, request: &RateRequest) -> ServiceResult<RatingOutcome> {
        let target_id = request.target()?;
        self.ensure_target(target_id).await?;

        let value = RatingValue::clamped(request.value);
        let reaction = Reaction::new(
            actor.key(),
            target_id,
            Stance::Rating(value),
            self.ctx.clock().now(),
        );
        self.ctx.reaction_repo().upsert_rating(&reaction).await?;

        let aggregate = AggregateService::new(self.ctx).recompute(target_id).await?;
        info!(target_id = %target_id, value = value.get(), "Rating stored");

        Ok(RatingOutcome { value, aggregate })
    }

    /// Grouped counts of active reactions for the requested targets
    #[instrument(skip(self))]
    pub async fn summary(&self, query: &SummaryQuery) -> ServiceResult<SummaryResponse> {
        let mut ids = Vec::new();
        if let Some(raw) = query.target_id.as_deref().filter(|s| !s.trim().is_empty()) {
            ids.push(parse_target_id(raw)?);
        }
        if let Some(raw) = query.target_ids.as_deref() {
            for id in parse_target_ids(raw)? {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        if ids.is_empty() {
            return Err(ServiceError::validation("target_ids_required"));
        }
        if ids.len() > crate::dto::MAX_TARGET_IDS {
            return Err(ServiceError::validation("too_many_target_ids"));
        }

        let breakdown = query
            .breakdown
            .as_deref()
            .map(str::parse::<Breakdown>)
            .transpose()?
            .unwrap_or_default();

        self.summarize(&ids, breakdown).await
    }

    /// Summary for already-parsed ids. Every requested id appears, even with no rows.
    pub async fn summarize(
        &self,
        target_ids: &[Snowflake],
        breakdown: Breakdown,
    ) -> ServiceResult<SummaryResponse> {
        let mut summary: SummaryResponse = target_ids
            .iter()
            .map(|id| {
                let entry = TargetSummary {
                    total: 0,
                    by_kind: breakdown.by_kind().then(BTreeMap::new),
                    by_emoji: breakdown.by_emoji().then(BTreeMap::new),
                };
                (*id, entry)
            })
            .collect();

        for group in self.ctx.reaction_repo().count_grouped(target_ids).await? {
            let Some(entry) = summary.get_mut(&group.target_id) else {
                continue;
            };
            entry.total += group.count;
            if let Some(by_kind) = entry.by_kind.as_mut() {
                *by_kind.entry(group.kind).or_insert(0) += group.count;
            }
            if let (Some(by_emoji), ReactionKind::Emoji, Some(emoji)) =
                (entry.by_emoji.as_mut(), group.kind, group.emoji)
            {
                *by_emoji.entry(emoji).or_insert(0) += group.count;
            }
        }

        Ok(summary)
    }

    /// The caller's own active reactions, optionally limited to some targets
    #[instrument(skip(self, query), fields(actor = %actor.key()))]
    pub async fn my_reactions(
        &self,
        actor: &Actor,
        query: &MyReactionsQuery,
    ) -> ServiceResult<Vec<MyReactionResponse>> {
        let filter = match query.target_ids.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(parse_target_ids(raw)?),
            _ => None,
        };

        let reactions = self
            .ctx
            .reaction_repo()
            .find_by_actor(&actor.key(), filter.as_deref())
            .await?;

        Ok(reactions.iter().map(MyReactionResponse::from).collect())
    }

    async fn ensure_target(&self, target_id: Snowflake) -> ServiceResult<()> {
        if self.ctx.target_repo().exists(target_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("target", target_id))
        }
    }
}
