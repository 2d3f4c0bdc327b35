//! Comment entity - a remark on a target, with its spam-defense metadata

use chrono::{DateTime, Utc};

use super::actor::ActorKey;
use crate::value_objects::Snowflake;

/// Comment entity
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Snowflake,
    pub target_id: Snowflake,
    pub actor: ActorKey,
    /// Set only when the author held an authenticated session
    pub author_id: Option<Snowflake>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub text: String,
    /// Fingerprint of the normalized text, used for duplicate detection
    pub text_hash: String,
    /// Salted digest of the client address; the raw address is never stored
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub risk_score: Option<f64>,
    pub is_published: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Visible in the public listing
    #[inline]
    pub fn is_public(&self) -> bool {
        self.is_active && self.is_published
    }

    /// Name shown publicly
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Anonymous")
    }
}
