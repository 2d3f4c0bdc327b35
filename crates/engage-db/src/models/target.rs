//! Target database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the `targets` table
#[derive(Debug, Clone, FromRow)]
pub struct TargetModel {
    pub id: i64,
    pub title: String,
    pub agg_like: i64,
    pub agg_love: i64,
    pub agg_yum: i64,
    pub agg_wow: i64,
    pub rating_avg: f64,
    pub rating_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
