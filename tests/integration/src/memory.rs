//! In-memory doubles of the storage and infrastructure ports
//!
//! The reaction double keeps one row per [`ReactionKey`], which is the same
//! uniqueness rule the database index enforces. Lookups yield before
//! returning so joined callers interleave between read and write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use engage_core::{
    ActorKey, Clock, Comment, CommentRepository, DomainError, RatingStats, Reaction,
    ReactionAggregate, ReactionGroupCount, ReactionKey, ReactionKind, ReactionRepository,
    RepoResult, RiskAssessment, RiskRequest, RiskVerifier, Snowflake, Stance, Target,
    TargetRepository,
};

// ============================================================================
// Reactions
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryReactionRepository {
    rows: DashMap<ReactionKey, Reaction>,
}

impl MemoryReactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active rows of a target, any actor
    pub fn rows_for(&self, target_id: Snowflake) -> Vec<Reaction> {
        self.rows
            .iter()
            .filter(|row| row.target_id == target_id && row.is_active)
            .map(|row| row.value().clone())
            .collect()
    }

    fn active(&self, target_id: Snowflake) -> impl Iterator<Item = Reaction> + '_ {
        self.rows
            .iter()
            .filter(move |row| row.target_id == target_id && row.is_active)
            .map(|row| row.value().clone())
    }
}

#[async_trait]
impl ReactionRepository for MemoryReactionRepository {
    async fn find(&self, key: &ReactionKey) -> RepoResult<Option<Reaction>> {
        let found = self
            .rows
            .get(key)
            .filter(|row| row.is_active)
            .map(|row| row.value().clone());
        // a stale read, like a concurrent transaction gets
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn create(&self, reaction: &Reaction) -> RepoResult<bool> {
        match self.rows.entry(reaction.key()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(reaction.clone());
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &ReactionKey) -> RepoResult<bool> {
        Ok(self.rows.remove(key).is_some())
    }

    async fn upsert_rating(&self, reaction: &Reaction) -> RepoResult<()> {
        if reaction.kind() != ReactionKind::Rating {
            return Err(DomainError::InternalError("upsert_rating needs a RATING row".into()));
        }
        self.rows
            .entry(reaction.key())
            .and_modify(|row| {
                row.stance = reaction.stance.clone();
                row.is_active = true;
                row.updated_at = reaction.updated_at;
            })
            .or_insert_with(|| reaction.clone());
        Ok(())
    }

    async fn find_by_actor(
        &self,
        actor: &ActorKey,
        targets: Option<&[Snowflake]>,
    ) -> RepoResult<Vec<Reaction>> {
        let mut rows: Vec<Reaction> = self
            .rows
            .iter()
            .filter(|row| row.actor == *actor && row.is_active)
            .filter(|row| targets.map_or(true, |ids| ids.contains(&row.target_id)))
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_by_kind(&self, target_id: Snowflake) -> RepoResult<Vec<(ReactionKind, i64)>> {
        let mut counts: HashMap<ReactionKind, i64> = HashMap::new();
        for row in self.active(target_id) {
            *counts.entry(row.kind()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn count_by_emoji(&self, target_id: Snowflake) -> RepoResult<Vec<(String, i64)>> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for row in self.active(target_id) {
            if let Stance::Emoji(emoji) = &row.stance {
                *counts.entry(emoji.as_str().to_owned()).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    async fn rating_stats(&self, target_id: Snowflake) -> RepoResult<RatingStats> {
        let values: Vec<f64> = self
            .active(target_id)
            .filter_map(|row| row.stance.value())
            .map(|value| f64::from(value.get()))
            .collect();

        let count = values.len() as i64;
        let avg = (count > 0).then(|| values.iter().sum::<f64>() / values.len() as f64);
        Ok(RatingStats { avg, count })
    }

    async fn count_grouped(&self, target_ids: &[Snowflake]) -> RepoResult<Vec<ReactionGroupCount>> {
        let mut counts: HashMap<(Snowflake, ReactionKind, Option<String>), i64> = HashMap::new();
        for row in self.rows.iter().filter(|row| row.is_active && target_ids.contains(&row.target_id)) {
            let emoji = row.stance.emoji().map(|e| e.as_str().to_owned());
            *counts.entry((row.target_id, row.kind(), emoji)).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|((target_id, kind, emoji), count)| ReactionGroupCount {
                target_id,
                kind,
                emoji,
                count,
            })
            .collect())
    }
}

// ============================================================================
// Targets
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryTargetRepository {
    targets: DashMap<Snowflake, Target>,
    fail_aggregate_writes: AtomicBool,
}

impl MemoryTargetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Snowflake) -> Option<Target> {
        self.targets.get(&id).map(|t| t.value().clone())
    }

    /// Overwrite a stored aggregate, e.g. to simulate drift
    pub fn corrupt_aggregate(&self, id: Snowflake, aggregate: ReactionAggregate) {
        if let Some(mut target) = self.targets.get_mut(&id) {
            target.aggregate = aggregate;
        }
    }

    /// Make every `update_aggregate` fail until switched off again
    pub fn fail_aggregate_writes(&self, fail: bool) {
        self.fail_aggregate_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TargetRepository for MemoryTargetRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Target>> {
        Ok(self.get(id))
    }

    async fn exists(&self, id: Snowflake) -> RepoResult<bool> {
        Ok(self.targets.contains_key(&id))
    }

    async fn create(&self, target: &Target) -> RepoResult<()> {
        self.targets.insert(target.id, target.clone());
        Ok(())
    }

    async fn update_aggregate(
        &self,
        id: Snowflake,
        aggregate: &ReactionAggregate,
    ) -> RepoResult<bool> {
        if self.fail_aggregate_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("aggregate write failed".into()));
        }
        Ok(self
            .targets
            .get_mut(&id)
            .map(|mut target| target.aggregate = *aggregate)
            .is_some())
    }

    async fn increment_comment_count(&self, id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .targets
            .get_mut(&id)
            .map(|mut target| target.comment_count += 1)
            .is_some())
    }

    async fn list_ids(&self, after: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>> {
        let mut ids: Vec<Snowflake> = self
            .targets
            .iter()
            .map(|t| *t.key())
            .filter(|id| after.map_or(true, |after| *id > after))
            .collect();
        ids.sort();
        ids.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(ids)
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryCommentRepository {
    comments: DashMap<Snowflake, Comment>,
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn all_for(&self, target_id: Snowflake) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|c| c.target_id == target_id)
            .map(|c| c.value().clone())
            .collect()
    }

    fn published(&self, target_id: Snowflake) -> Vec<Comment> {
        let mut rows: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.target_id == target_id && c.is_active && c.is_published)
            .map(|c| c.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        self.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_published_by_target(
        &self,
        target_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Comment>> {
        Ok(self
            .published(target_id)
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count_published_by_target(&self, target_id: Snowflake) -> RepoResult<i64> {
        Ok(self.published(target_id).len() as i64)
    }

    async fn find_latest_by_actor(
        &self,
        actor: &ActorKey,
        target_id: Snowflake,
        since: DateTime<Utc>,
    ) -> RepoResult<Option<Comment>> {
        Ok(self
            .comments
            .iter()
            .filter(|c| c.actor == *actor && c.target_id == target_id && c.created_at >= since)
            .map(|c| c.value().clone())
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))))
    }
}

// ============================================================================
// Clock and risk provider
// ============================================================================

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(TimeDelta::seconds(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// Risk verifier with a scripted verdict that records what it was asked
#[derive(Debug)]
pub struct StubRiskVerifier {
    verdict: Mutex<Result<RiskAssessment, String>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<RiskRequest>>,
}

impl StubRiskVerifier {
    /// Valid token, matching action, high score
    pub fn passing(action: Option<&str>) -> Self {
        Self::with_verdict(Ok(RiskAssessment {
            valid: true,
            invalid_reason: None,
            action: action.map(str::to_owned),
            score: Some(0.9),
        }))
    }

    pub fn with_verdict(verdict: Result<RiskAssessment, String>) -> Self {
        Self {
            verdict: Mutex::new(verdict),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn set_verdict(&self, verdict: Result<RiskAssessment, String>) {
        *self.verdict.lock().unwrap() = verdict;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RiskRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl RiskVerifier for StubRiskVerifier {
    async fn assess(&self, request: &RiskRequest) -> RepoResult<RiskAssessment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.verdict
            .lock()
            .unwrap()
            .clone()
            .map_err(DomainError::RiskProviderError)
    }
}
