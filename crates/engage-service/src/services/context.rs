//! Service context - dependency container for services
//!
//! Holds the repositories, the cooldown store, the risk verifier and the
//! tuning every service reads.

use std::sync::Arc;

use engage_cache::MemoryCooldownStore;
use engage_common::{CommentConfig, RiskConfig};
use engage_core::traits::{
    Clock, CommentRepository, CooldownStore, ReactionRepository, RiskVerifier, SystemClock,
    TargetRepository,
};
use engage_core::{Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};
use super::rate_limit::SlidingWindowLimiter;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    reaction_repo: Arc<dyn ReactionRepository>,
    target_repo: Arc<dyn TargetRepository>,
    comment_repo: Arc<dyn CommentRepository>,

    // Abuse gates
    cooldown_store: Arc<dyn CooldownStore>,
    risk_verifier: Option<Arc<dyn RiskVerifier>>,
    comment_limiter: Arc<SlidingWindowLimiter>,

    clock: Arc<dyn Clock>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    comment_config: Arc<CommentConfig>,
    risk_config: Arc<RiskConfig>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn target_repo(&self) -> &dyn TargetRepository {
        self.target_repo.as_ref()
    }

    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    // === Abuse gates ===

    pub fn cooldown_store(&self) -> &dyn CooldownStore {
        self.cooldown_store.as_ref()
    }

    /// `None` only while risk verification is disabled
    pub fn risk_verifier(&self) -> Option<&dyn RiskVerifier> {
        self.risk_verifier.as_deref()
    }

    pub fn comment_limiter(&self) -> &SlidingWindowLimiter {
        &self.comment_limiter
    }

    // === Settings ===

    pub fn comment_config(&self) -> &CommentConfig {
        &self.comment_config
    }

    pub fn risk_config(&self) -> &RiskConfig {
        &self.risk_config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("risk_enabled", &self.risk_config.enabled)
            .field("comment_config", &self.comment_config)
            .finish()
    }
}

/// Builder for [`ServiceContext`]
///
/// Repositories are required. The clock defaults to [`SystemClock`], the
/// cooldown store to an in-process [`MemoryCooldownStore`], and the settings
/// to their defaults.
#[derive(Default)]
pub struct ServiceContextBuilder {
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    target_repo: Option<Arc<dyn TargetRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    cooldown_store: Option<Arc<dyn CooldownStore>>,
    risk_verifier: Option<Arc<dyn RiskVerifier>>,
    clock: Option<Arc<dyn Clock>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    comment_config: Option<CommentConfig>,
    risk_config: Option<RiskConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn target_repo(mut self, repo: Arc<dyn TargetRepository>) -> Self {
        self.target_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn cooldown_store(mut self, store: Arc<dyn CooldownStore>) -> Self {
        self.cooldown_store = Some(store);
        self
    }

    pub fn risk_verifier(mut self, verifier: Arc<dyn RiskVerifier>) -> Self {
        self.risk_verifier = Some(verifier);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn comment_config(mut self, config: CommentConfig) -> Self {
        self.comment_config = Some(config);
        self
    }

    pub fn risk_config(mut self, config: RiskConfig) -> Self {
        self.risk_config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a repository is missing, or if
    /// risk verification is enabled without a verifier
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let comment_config = self.comment_config.unwrap_or_default();
        let risk_config = self.risk_config.unwrap_or_default();

        if risk_config.enabled && self.risk_verifier.is_none() {
            return Err(ServiceError::validation("risk_verifier is required"));
        }

        let comment_limiter = SlidingWindowLimiter::new(
            comment_config.rate_limit_max,
            comment_config.rate_limit_window(),
        );

        Ok(ServiceContext {
            reaction_repo: self
                .reaction_repo
                .ok_or_else(|| ServiceError::validation("reaction_repo is required"))?,
            target_repo: self
                .target_repo
                .ok_or_else(|| ServiceError::validation("target_repo is required"))?,
            comment_repo: self
                .comment_repo
                .ok_or_else(|| ServiceError::validation("comment_repo is required"))?,
            cooldown_store: self
                .cooldown_store
                .unwrap_or_else(|| Arc::new(MemoryCooldownStore::new())),
            risk_verifier: self.risk_verifier,
            comment_limiter: Arc::new(comment_limiter),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            comment_config: Arc::new(comment_config),
            risk_config: Arc::new(risk_config),
        })
    }
}
