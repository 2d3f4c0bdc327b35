//! Comment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the `comments` table
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: i64,
    pub target_id: i64,
    pub actor_key: String,
    pub author_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub text: String,
    pub text_hash: String,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub risk_score: Option<f64>,
    pub is_published: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
