//! Infrastructure ports that are not data repositories

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::repositories::RepoResult;

/// Source of "now"; swapped for a manual clock in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// No live stamp existed; `now` has been recorded for the key
    Acquired,
    /// A stamp is live; the caller must wait `remaining`
    Active { remaining: Duration },
}

/// Per-key last-submission stamps with expiry.
///
/// `try_acquire` is an atomic check-and-set: at most one of several racing
/// callers for the same key observes `Acquired` within one cooldown window.
#[async_trait]
pub trait CooldownStore: Send + Sync {
    async fn try_acquire(
        &self,
        key: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> RepoResult<CooldownDecision>;

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

/// Input of one risk assessment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskRequest {
    pub token: String,
    pub user_ip: Option<String>,
    pub user_agent: Option<String>,
    pub expected_action: Option<String>,
}

/// Fields consumed from the provider's verdict
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiskAssessment {
    pub valid: bool,
    pub invalid_reason: Option<String>,
    pub action: Option<String>,
    pub score: Option<f64>,
}

/// External anti-bot assessment. Transport, timeout and decoding failures
/// are returned as `DomainError::RiskProviderError`.
#[async_trait]
pub trait RiskVerifier: Send + Sync {
    async fn assess(&self, request: &RiskRequest) -> RepoResult<RiskAssessment>;
}
