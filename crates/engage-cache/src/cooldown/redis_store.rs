use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engage_core::{CooldownDecision, CooldownStore, DomainError, RepoResult};
use tracing::instrument;

use crate::pool::{RedisPoolError, SharedRedisPool};

const KEY_PREFIX: &str = "engage:cooldown:";

/// Cooldown stamps shared by every instance through Redis.
///
/// Acquire is a single `SET NX PX`; the key expiring is what ends the window.
#[derive(Debug, Clone)]
pub struct RedisCooldownStore {
    pool: SharedRedisPool,
}

impl RedisCooldownStore {
    pub fn new(pool: SharedRedisPool) -> Self {
        Self { pool }
    }

    fn key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

/// The key with any network address masked; addresses never reach the logs
fn loggable_key(key: &str) -> String {
    match key.find("ip:") {
        Some(at) if at == 0 || key[..at].ends_with(':') => format!("{}ip:<redacted>", &key[..at]),
        _ => key.to_owned(),
    }
}

fn map_redis_error(err: RedisPoolError) -> DomainError {
    tracing::error!(error = %err, "Redis cooldown operation failed");
    DomainError::CacheError(err.to_string())
}

#[async_trait]
impl CooldownStore for RedisCooldownStore {
    #[instrument(skip_all, fields(key = %loggable_key(key)))]
    async fn try_acquire(
        &self,
        key: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> RepoResult<CooldownDecision> {
        let redis_key = Self::key(key);
        let ttl_millis = u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX).max(1);

        let acquired = self
            .pool
            .set_nx_px(&redis_key, now.timestamp_millis(), ttl_millis)
            .await
            .map_err(map_redis_error)?;
        if acquired {
            return Ok(CooldownDecision::Acquired);
        }

        // the key may expire between SET and PTTL; report the smallest wait then
        let remaining = self
            .pool
            .pttl(&redis_key)
            .await
            .map_err(map_redis_error)?
            .map_or(Duration::from_millis(1), Duration::from_millis);
        Ok(CooldownDecision::Active { remaining })
    }

    async fn ping(&self) -> RepoResult<()> {
        self.pool.health_check().await.map_err(map_redis_error)
    }
}
