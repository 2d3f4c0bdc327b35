//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    ActorKey, Comment, RatingStats, Reaction, ReactionAggregate, ReactionKey, ReactionKind, Target,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// One row of a multi-target grouped count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionGroupCount {
    pub target_id: Snowflake,
    pub kind: ReactionKind,
    /// Present only for EMOJI groups
    pub emoji: Option<String>,
    pub count: i64,
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Find the unique active row for a key
    async fn find(&self, key: &ReactionKey) -> RepoResult<Option<Reaction>>;

    /// Insert a reaction. Returns `false` when the uniqueness constraint
    /// rejected it because an equal row already exists.
    async fn create(&self, reaction: &Reaction) -> RepoResult<bool>;

    /// Remove the row for a key. Returns `true` if a row was removed.
    async fn delete(&self, key: &ReactionKey) -> RepoResult<bool>;

    /// Create the RATING row or overwrite its value in place
    async fn upsert_rating(&self, reaction: &Reaction) -> RepoResult<()>;

    /// All active rows of one actor, optionally restricted to some targets
    async fn find_by_actor(
        &self,
        actor: &ActorKey,
        targets: Option<&[Snowflake]>,
    ) -> RepoResult<Vec<Reaction>>;

    /// Active rows of a target grouped by kind
    async fn count_by_kind(&self, target_id: Snowflake) -> RepoResult<Vec<(ReactionKind, i64)>>;

    /// Active EMOJI rows of a target grouped by emoji
    async fn count_by_emoji(&self, target_id: Snowflake) -> RepoResult<Vec<(String, i64)>>;

    /// Average and count of active RATING values of a target
    async fn rating_stats(&self, target_id: Snowflake) -> RepoResult<RatingStats>;

    /// Active rows of several targets grouped by (target, kind, emoji)
    async fn count_grouped(&self, target_ids: &[Snowflake]) -> RepoResult<Vec<ReactionGroupCount>>;
}

// ============================================================================
// Target Repository
// ============================================================================

#[async_trait]
pub trait TargetRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Target>>;

    async fn exists(&self, id: Snowflake) -> RepoResult<bool>;

    async fn create(&self, target: &Target) -> RepoResult<()>;

    /// Overwrite the aggregate columns in a single write.
    /// Returns `false` if the target does not exist.
    async fn update_aggregate(
        &self,
        id: Snowflake,
        aggregate: &ReactionAggregate,
    ) -> RepoResult<bool>;

    /// Returns `false` if the target does not exist
    async fn increment_comment_count(&self, id: Snowflake) -> RepoResult<bool>;

    /// Target ids in ascending order, strictly after `after`
    async fn list_ids(&self, after: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>>;

    /// Cheap reachability probe of the backing store
    async fn ping(&self) -> RepoResult<()>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> RepoResult<()>;

    /// Active, published comments of a target, newest first
    async fn find_published_by_target(
        &self,
        target_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Comment>>;

    async fn count_published_by_target(&self, target_id: Snowflake) -> RepoResult<i64>;

    /// Most recent comment of an actor on a target created at or after `since`,
    /// regardless of publication state
    async fn find_latest_by_actor(
        &self,
        actor: &ActorKey,
        target_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<Option<Comment>>;
}
