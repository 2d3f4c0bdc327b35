//! ReactionAggregate - denormalized counters stored on a target

use serde::{Deserialize, Serialize};

use super::reaction::ReactionKind;
use crate::value_objects::EmojiBucket;

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean and count of active RATING rows for one target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingStats {
    pub avg: Option<f64>,
    pub count: i64,
}

/// Snapshot written onto the target by the recompute engine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionAggregate {
    pub like: i64,
    pub love: i64,
    pub yum: i64,
    pub wow: i64,
    pub rating_avg: f64,
    pub rating_count: i64,
}

impl ReactionAggregate {
    /// Compose a snapshot from the three independent groupings.
    ///
    /// Emoji without a bucket are dropped here; they still appear in summaries.
    pub fn compose<'a, K, E>(by_kind: K, by_emoji: E, rating: RatingStats) -> Self
    where
        K: IntoIterator<Item = (ReactionKind, i64)>,
        E: IntoIterator<Item = (&'a str, i64)>,
    {
        let like = by_kind
            .into_iter()
            .filter(|(kind, _)| *kind == ReactionKind::Like)
            .map(|(_, count)| count)
            .sum();

        let mut aggregate = Self {
            like,
            ..Self::default()
        };
        for (emoji, count) in by_emoji {
            match EmojiBucket::classify(emoji) {
                Some(EmojiBucket::Love) => aggregate.love += count,
                Some(EmojiBucket::Yum) => aggregate.yum += count,
                Some(EmojiBucket::Wow) => aggregate.wow += count,
                None => {}
            }
        }

        aggregate.rating_count = rating.count;
        aggregate.rating_avg = match rating.avg {
            Some(avg) if rating.count > 0 => round2(avg),
            _ => 0.0,
        };
        aggregate
    }
}
