use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use engage_core::{CooldownDecision, CooldownStore, RepoResult};

/// Map size above which expired stamps are swept on acquire
const SWEEP_THRESHOLD: usize = 10_000;

/// In-process map from cooldown key to last submission time
#[derive(Debug, Default)]
pub struct MemoryCooldownStore {
    stamps: DashMap<String, DateTime<Utc>>,
}

impl MemoryCooldownStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    fn remaining(last: DateTime<Utc>, cooldown: Duration, now: DateTime<Utc>) -> Option<Duration> {
        let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
        cooldown.checked_sub(elapsed).filter(|left| !left.is_zero())
    }

    fn sweep(&self, cooldown: Duration, now: DateTime<Utc>) {
        let before = self.stamps.len();
        self.stamps
            .retain(|_, last| Self::remaining(*last, cooldown, now).is_some());
        tracing::debug!(before, after = self.stamps.len(), "Swept cooldown stamps");
    }
}

#[async_trait]
impl CooldownStore for MemoryCooldownStore {
    async fn try_acquire(
        &self,
        key: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> RepoResult<CooldownDecision> {
        if self.stamps.len() > SWEEP_THRESHOLD {
            self.sweep(cooldown, now);
        }

        // the entry holds the shard lock, so check and stamp are atomic per key
        match self.stamps.entry(key.to_owned()) {
            Entry::Occupied(mut stamp) => {
                if let Some(remaining) = Self::remaining(*stamp.get(), cooldown, now) {
                    return Ok(CooldownDecision::Active { remaining });
                }
                stamp.insert(now);
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
            }
        }
        Ok(CooldownDecision::Acquired)
    }
}
