//! Abuse gates in front of comment creation.
//!
//! Stages run strictly in order and the first rejection ends the request:
//!
//! 1. risk verification (external, skipped when disabled)
//! 2. per-actor sliding-window rate limit
//! 3. cooldown (the stamp is taken here, even if a later stage rejects)
//! 4. content heuristics
//! 5. duplicate text on the same target

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use engage_core::text::{count_links, text_fingerprint, text_length};
use engage_core::{Actor, CooldownDecision, RiskRequest, Snowflake};
use tracing::{info, instrument, warn};
use validator::ValidateEmail;

use crate::dto::CreateCommentRequest;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::rate_limit::RateLimitInfo;

const MAX_RISK_TOKEN_LEN: usize = 4096;

/// Network details of the submitting client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Who is submitting, as resolved for this request
#[derive(Debug, Clone, Copy)]
pub struct Submitter<'r> {
    pub actor: &'r Actor,
    /// The guest id was minted on this very request
    pub fresh: bool,
    pub client: &'r ClientInfo,
}

impl Submitter<'_> {
    /// Keys the limiter and the cooldown count against. A fresh guest has no
    /// history yet, so the network address leads; the minted id follows so
    /// the guest's next request, now carrying the cookie, is still held.
    pub fn gate_keys(&self) -> Vec<String> {
        let actor_key = self.actor.key().to_string();
        match (self.fresh, self.client.ip.as_deref()) {
            (true, Some(ip)) => vec![format!("ip:{ip}"), actor_key],
            _ => vec![actor_key],
        }
    }
}

/// What a submission that cleared every gate carries into persistence
#[derive(Debug, Clone, PartialEq)]
pub struct Clearance {
    pub risk_score: Option<f64>,
    pub quota: RateLimitInfo,
    pub text_hash: String,
}

pub struct AbuseGuard<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AbuseGuard<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run stages 1 through 5 for one submission
    #[instrument(skip_all, fields(target_id = %target_id))]
    pub async fn screen(
        &self,
        submitter: Submitter<'_>,
        target_id: Snowflake,
        body: &CreateCommentRequest,
    ) -> ServiceResult<Clearance> {
        let risk_score = self
            .verify_risk(body.risk_token.as_deref(), submitter.client)
            .await
            .inspect_err(|e| rejected("risk", e))?;

        let now = self.ctx.clock().now();
        let keys = submitter.gate_keys();

        let quota = self.check_rate(&keys, now).inspect_err(|e| rejected("rate_limit", e))?;

        self.check_cooldown(&keys, now)
            .await
            .inspect_err(|e| rejected("cooldown", e))?;

        self.check_content(submitter.actor, body)
            .inspect_err(|e| rejected("content", e))?;

        let text_hash = text_fingerprint(&body.text);
        self.check_duplicate(submitter.actor, target_id, &text_hash, now)
            .await
            .inspect_err(|e| rejected("duplicate", e))?;

        Ok(Clearance {
            risk_score,
            quota,
            text_hash,
        })
    }

    /// Stage 1. Returns the provider's score, or `None` when verification is off.
    pub async fn verify_risk(
        &self,
        token: Option<&str>,
        client: &ClientInfo,
    ) -> ServiceResult<Option<f64>> {
        let config = self.ctx.risk_config();
        if !config.enabled {
            return Ok(None);
        }

        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(ServiceError::validation("risk_token_missing"));
        };
        if !is_well_formed_token(token) {
            return Err(ServiceError::validation("risk_token_malformed"));
        }

        let verifier = self
            .ctx
            .risk_verifier()
            .ok_or_else(|| ServiceError::internal("risk verification enabled without a verifier"))?;

        let request = RiskRequest {
            token: token.to_owned(),
            user_ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            expected_action: config.expected_action.clone(),
        };
        let assessment = verifier.assess(&request).await.inspect_err(|e| {
            warn!(error = %e, "Risk assessment failed");
        })?;

        if !assessment.valid {
            info!(invalid_reason = ?assessment.invalid_reason, "Risk token rejected");
            return Err(ServiceError::unauthorized("risk_token_invalid"));
        }
        if let Some(expected) = config.expected_action.as_deref() {
            if assessment.action.as_deref() != Some(expected) {
                return Err(ServiceError::unauthorized("risk_action_mismatch"));
            }
        }
        let Some(score) = assessment.score else {
            warn!("Risk assessment carried no score");
            return Err(engage_core::DomainError::RiskProviderError("missing score".into()).into());
        };
        if score < config.min_score {
            return Err(ServiceError::unauthorized("risk_score_too_low"));
        }

        Ok(Some(score))
    }

    /// Stage 2. A hit is recorded under every key; the tightest quota wins.
    pub fn check_rate(&self, keys: &[String], now: DateTime<Utc>) -> ServiceResult<RateLimitInfo> {
        let limiter = self.ctx.comment_limiter();
        let mut tightest: Option<RateLimitInfo> = None;
        let mut rejection: Option<RateLimitInfo> = None;

        for key in keys {
            match limiter.check(key, now) {
                Ok(info) => {
                    if tightest.is_none_or(|t| info.remaining < t.remaining) {
                        tightest = Some(info);
                    }
                }
                Err(info) => {
                    if rejection.is_none_or(|r| info.reset_after_secs > r.reset_after_secs) {
                        rejection = Some(info);
                    }
                }
            }
        }

        match (rejection, tightest) {
            (Some(info), _) => Err(ServiceError::rate_limited(info)),
            (None, Some(info)) => Ok(info),
            (None, None) => Err(ServiceError::internal("no gate key for submission")),
        }
    }

    /// Stage 3. Every free key is stamped with `now`, even when another key
    /// is still cooling down; the longest remaining wait is reported.
    pub async fn check_cooldown(&self, keys: &[String], now: DateTime<Utc>) -> ServiceResult<()> {
        let cooldown = self.ctx.comment_config().cooldown();
        if cooldown.is_zero() {
            return Ok(());
        }

        let mut longest: Option<Duration> = None;
        for key in keys {
            let stamp_key = format!("comment:{key}");
            if let CooldownDecision::Active { remaining } = self
                .ctx
                .cooldown_store()
                .try_acquire(&stamp_key, cooldown, now)
                .await?
            {
                longest = Some(longest.map_or(remaining, |l| l.max(remaining)));
            }
        }

        match longest {
            None => Ok(()),
            Some(remaining) => {
                let secs = u64::try_from(remaining.as_millis().div_ceil(1000)).unwrap_or(u64::MAX);
                Err(ServiceError::cooldown(secs.max(1)))
            }
        }
    }

    /// Stage 4
    pub fn check_content(&self, actor: &Actor, body: &CreateCommentRequest) -> ServiceResult<()> {
        let config = self.ctx.comment_config();

        let length = text_length(&body.text);
        if length < config.min_length {
            return Err(ServiceError::validation("text_too_short"));
        }
        if length > config.max_length {
            return Err(ServiceError::validation("text_too_long"));
        }
        if count_links(&body.text) > config.max_links {
            return Err(ServiceError::validation("too_many_links"));
        }

        if actor.is_guest() {
            if non_blank(body.name.as_deref()).is_none() {
                return Err(ServiceError::validation("name_required"));
            }
            let Some(email) = non_blank(body.email.as_deref()) else {
                return Err(ServiceError::validation("email_required"));
            };
            if !email.validate_email() {
                return Err(ServiceError::validation("invalid_email"));
            }
        } else if let Some(email) = non_blank(body.email.as_deref()) {
            if !email.validate_email() {
                return Err(ServiceError::validation("invalid_email"));
            }
        }

        Ok(())
    }

    /// Stage 5. Compares against the actor's latest comment on the target
    /// inside the duplicate window.
    pub async fn check_duplicate(
        &self,
        actor: &Actor,
        target_id: Snowflake,
        text_hash: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let window = TimeDelta::seconds(self.ctx.comment_config().duplicate_window_seconds);
        let latest = self
            .ctx
            .comment_repo()
            .find_latest_by_actor(&actor.key(), target_id, now - window)
            .await?;

        match latest {
            Some(previous) if previous.text_hash == text_hash => {
                Err(ServiceError::conflict("duplicate_comment"))
            }
            _ => Ok(()),
        }
    }
}

/// Trimmed value, or `None` when absent or blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_well_formed_token(token: &str) -> bool {
    token.len() <= MAX_RISK_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'='))
}

fn rejected(stage: &'static str, err: &ServiceError) {
    if err.status_code() >= 500 {
        return;
    }
    info!(stage, reason = %err.reason(), "Comment rejected");
}
