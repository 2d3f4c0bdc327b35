//! Reaction database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the `reactions` table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub actor_key: String,
    pub target_id: i64,
    pub kind: String,
    pub emoji: Option<String>,
    pub value: Option<i16>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct KindCountModel {
    pub kind: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EmojiCountModel {
    pub emoji: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct RatingStatsModel {
    pub avg: Option<f64>,
    pub count: i64,
}

/// Multi-target grouping used by summaries
#[derive(Debug, Clone, FromRow)]
pub struct GroupCountModel {
    pub target_id: i64,
    pub kind: String,
    pub emoji: Option<String>,
    pub count: i64,
}
