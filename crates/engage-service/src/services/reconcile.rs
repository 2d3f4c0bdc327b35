//! Periodic aggregate reconciliation.
//!
//! Walks every target in id order and re-runs the recompute engine, so an
//! aggregate left stale by a failed or raced recompute converges again.

use std::sync::Arc;
use std::time::Duration;

use engage_common::ReconcileConfig;
use engage_core::Snowflake;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::aggregate::AggregateService;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Counters of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub failed: usize,
}

pub struct AggregateReconciler {
    ctx: Arc<ServiceContext>,
    interval: Duration,
    batch_size: i64,
}

impl AggregateReconciler {
    pub fn new(ctx: Arc<ServiceContext>, config: &ReconcileConfig) -> Self {
        Self {
            ctx,
            interval: Duration::from_secs(config.interval_seconds.max(1)),
            batch_size: config.batch_size.max(1),
        }
    }

    /// Recompute every target once. A failing target is logged and skipped;
    /// only a failure to list targets aborts the pass.
    pub async fn run_pass(&self) -> ServiceResult<ReconcileReport> {
        let engine = AggregateService::new(&self.ctx);
        let mut report = ReconcileReport::default();
        let mut after: Option<Snowflake> = None;

        loop {
            let batch = self
                .ctx
                .target_repo()
                .list_ids(after, self.batch_size)
                .await?;
            let Some(last) = batch.last().copied() else {
                break;
            };

            for target_id in &batch {
                report.scanned += 1;
                if let Err(e) = engine.recompute(*target_id).await {
                    report.failed += 1;
                    warn!(target_id = %target_id, error = %e, "Aggregate reconcile failed");
                }
            }

            if (batch.len() as i64) < self.batch_size {
                break;
            }
            after = Some(last);
        }

        Ok(report)
    }

    /// Run passes forever on a fixed interval. The first pass starts after one interval.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match self.run_pass().await {
                    Ok(report) => info!(
                        scanned = report.scanned,
                        failed = report.failed,
                        "Aggregate reconcile pass finished"
                    ),
                    Err(e) => warn!(error = %e, "Aggregate reconcile pass aborted"),
                }
            }
        })
    }
}
