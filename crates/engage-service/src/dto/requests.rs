//! Request DTOs for API endpoints
//!
//! Bodies implement `Deserialize` and `Validate`. Shape checks live here;
//! the comment content rules run inside the abuse gates so their order holds.

use engage_core::{DomainError, Snowflake};
use serde::Deserialize;
use validator::Validate;

/// Upper bound on ids accepted by one summary or "my reactions" call
pub const MAX_TARGET_IDS: usize = 100;

/// A target id as clients send it: JSON number or decimal string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TargetIdInput {
    Number(i64),
    Text(String),
}

impl TargetIdInput {
    pub fn parse(&self) -> Result<Snowflake, DomainError> {
        match self {
            Self::Number(n) if *n > 0 => Ok(Snowflake::new(*n)),
            Self::Number(n) => Err(DomainError::InvalidTargetId(n.to_string())),
            Self::Text(raw) => parse_target_id(raw),
        }
    }
}

pub fn parse_target_id(raw: &str) -> Result<Snowflake, DomainError> {
    Snowflake::parse(raw).map_err(|_| DomainError::InvalidTargetId(raw.to_owned()))
}

/// Parse a comma-separated id list, dropping duplicates and keeping order
pub fn parse_target_ids(raw: &str) -> Result<Vec<Snowflake>, DomainError> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = parse_target_id(part)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.len() > MAX_TARGET_IDS {
        return Err(DomainError::ValidationError("too_many_target_ids".into()));
    }
    Ok(ids)
}

fn required_target(target_id: Option<&TargetIdInput>) -> Result<Snowflake, DomainError> {
    target_id
        .ok_or_else(|| DomainError::InvalidTargetId(String::new()))?
        .parse()
}

// ============================================================================
// Reaction Requests
// ============================================================================

/// `POST /reactions/toggle`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    #[serde(default)]
    pub target_id: Option<TargetIdInput>,

    #[validate(length(min = 1, max = 16, message = "invalid_kind"))]
    pub kind: String,

    #[validate(length(max = 64, message = "invalid_emoji"))]
    pub emoji: Option<String>,
}

impl ToggleReactionRequest {
    pub fn target(&self) -> Result<Snowflake, DomainError> {
        required_target(self.target_id.as_ref())
    }
}

/// `POST /reactions/set`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetReactionRequest {
    #[serde(default)]
    pub target_id: Option<TargetIdInput>,

    #[validate(length(min = 1, max = 16, message = "invalid_kind"))]
    pub kind: String,

    pub on: bool,

    #[validate(length(max = 64, message = "invalid_emoji"))]
    pub emoji: Option<String>,
}

impl SetReactionRequest {
    pub fn target(&self) -> Result<Snowflake, DomainError> {
        required_target(self.target_id.as_ref())
    }
}

/// `POST /reactions/rate`. Out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    #[serde(default)]
    pub target_id: Option<TargetIdInput>,

    pub value: i64,
}

impl RateRequest {
    pub fn target(&self) -> Result<Snowflake, DomainError> {
        required_target(self.target_id.as_ref())
    }
}

/// `GET /reactions/summary`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub target_id: Option<String>,
    pub target_ids: Option<String>,
    pub breakdown: Option<String>,
}

/// `GET /reactions/me`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyReactionsQuery {
    pub target_ids: Option<String>,
}

// ============================================================================
// Comment Requests
// ============================================================================

/// `POST /comments/target/:id`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(max = 100, message = "name_too_long"))]
    pub name: Option<String>,

    #[validate(length(max = 254, message = "email_too_long"))]
    pub email: Option<String>,

    #[serde(default)]
    pub text: String,

    /// Client assertion for the risk provider; also accepted as a header
    pub risk_token: Option<String>,
}

/// `GET /comments/target/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
