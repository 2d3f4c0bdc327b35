//! Test fixtures and data generators
//!
//! Configuration, a fully wired in-memory service context, and request builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use engage_common::AppConfig;
use engage_core::{Snowflake, Target, TargetRepository};
use engage_service::dto::{
    CreateCommentRequest, RateRequest, SetReactionRequest, TargetIdInput, ToggleReactionRequest,
};
use engage_service::{ClientInfo, ServiceContext};

use crate::memory::{
    ManualClock, MemoryCommentRepository, MemoryReactionRepository, MemoryTargetRepository,
    StubRiskVerifier,
};

pub const COOKIE_NAME: &str = "eid";
pub const RISK_ACTION: &str = "comment";

/// Counter for unique target ids
static COUNTER: AtomicU64 = AtomicU64::new(1_000);

pub fn unique_target_id() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst) as i64)
}

/// Configuration with every required variable set and the global governor
/// opened wide; `overrides` replace or add variables
pub fn test_config(overrides: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("API_PORT", "0"),
        ("DATABASE_URL", "postgres://unused/engage"),
        ("JWT_SECRET", "integration-jwt-secret"),
        ("ACTOR_COOKIE_NAME", COOKIE_NAME),
        ("ACTOR_COOKIE_SECRET", "integration-cookie-secret"),
        ("ACTOR_COOKIE_SECURE", "false"),
        ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000"),
        ("RATE_LIMIT_BURST", "1000"),
        ("TRUSTED_PROXIES", "127.0.0.1"),
        ("COMMENT_IP_HASH_SALT", "pepper"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in overrides {
        vars.insert((*key).to_string(), (*value).to_string());
    }

    AppConfig::from_map(&vars).expect("test configuration is valid")
}

/// Risk verification switched on with a matching expected action
pub fn risk_overrides() -> Vec<(&'static str, &'static str)> {
    vec![
        ("RISK_ENABLED", "true"),
        ("RISK_PROJECT_ID", "recipes"),
        ("RISK_API_KEY", "api-key"),
        ("RISK_SITE_KEY", "site-key"),
        ("RISK_EXPECTED_ACTION", RISK_ACTION),
        ("RISK_MIN_SCORE", "0.5"),
    ]
}

/// In-memory stores plus the service context built on them
pub struct Harness {
    pub config: AppConfig,
    pub reactions: Arc<MemoryReactionRepository>,
    pub targets: Arc<MemoryTargetRepository>,
    pub comments: Arc<MemoryCommentRepository>,
    pub clock: Arc<ManualClock>,
    pub risk: Arc<StubRiskVerifier>,
    pub context: Arc<ServiceContext>,
}

impl Harness {
    pub fn new(overrides: &[(&str, &str)]) -> Self {
        Self::with_config(test_config(overrides))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let reactions = Arc::new(MemoryReactionRepository::new());
        let targets = Arc::new(MemoryTargetRepository::new());
        let comments = Arc::new(MemoryCommentRepository::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let risk = Arc::new(StubRiskVerifier::passing(Some(RISK_ACTION)));

        let context = ServiceContext::builder()
            .reaction_repo(reactions.clone())
            .target_repo(targets.clone())
            .comment_repo(comments.clone())
            .risk_verifier(risk.clone())
            .clock(clock.clone())
            .comment_config(config.comments.clone())
            .risk_config(config.risk.clone())
            .build()
            .expect("service context builds");

        Self {
            config,
            reactions,
            targets,
            comments,
            clock,
            risk,
            context: Arc::new(context),
        }
    }

    /// Store a fresh target and return its id
    pub async fn target(&self) -> Snowflake {
        let id = unique_target_id();
        self.targets
            .create(&Target::new(id, format!("Recipe {id}"), Utc::now()))
            .await
            .expect("target stored");
        id
    }
}

pub fn client(ip: &str) -> ClientInfo {
    ClientInfo {
        ip: Some(ip.to_string()),
        user_agent: Some("integration-tests/1.0".to_string()),
    }
}

pub fn guest_comment(text: &str) -> CreateCommentRequest {
    CreateCommentRequest {
        name: Some("Ana".to_string()),
        email: Some("a@b.com".to_string()),
        text: text.to_string(),
        risk_token: None,
    }
}

pub fn toggle(target_id: Snowflake, kind: &str, emoji: Option<&str>) -> ToggleReactionRequest {
    ToggleReactionRequest {
        target_id: Some(TargetIdInput::Text(target_id.to_string())),
        kind: kind.to_string(),
        emoji: emoji.map(str::to_string),
    }
}

pub fn set(target_id: Snowflake, kind: &str, on: bool) -> SetReactionRequest {
    SetReactionRequest {
        target_id: Some(TargetIdInput::Text(target_id.to_string())),
        kind: kind.to_string(),
        on,
        emoji: None,
    }
}

pub fn rate(target_id: Snowflake, value: i64) -> RateRequest {
    RateRequest {
        target_id: Some(TargetIdInput::Text(target_id.to_string())),
        value,
    }
}
