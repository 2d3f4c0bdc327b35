//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` with camelCase fields.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use engage_core::{ReactionAggregate, ReactionKind, Snowflake};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Page-numbered listing
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: i64) -> Self {
        Self {
            data,
            pagination: PageMeta::new(page, limit, total),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub pages: u32,
    pub total: i64,
    pub limit: u32,
}

impl PageMeta {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total = total.max(0);
        let pages = (total as u64).div_ceil(u64::from(limit.max(1)));
        Self {
            page,
            pages: u32::try_from(pages).unwrap_or(u32::MAX),
            total,
            limit,
        }
    }
}

// ============================================================================
// Reaction Responses
// ============================================================================

/// Result of toggle / set
#[derive(Debug, Clone, Serialize)]
pub struct ReactionStateResponse {
    pub on: bool,
    pub aggregate: ReactionAggregate,
}

/// Result of rate
#[derive(Debug, Clone, Serialize)]
pub struct RatingResponse {
    pub value: u8,
    pub aggregate: ReactionAggregate,
}

/// Grouped counts for one target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSummary {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_kind: Option<BTreeMap<ReactionKind, i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_emoji: Option<BTreeMap<String, i64>>,
}

/// Summary keyed by target id
pub type SummaryResponse = BTreeMap<Snowflake, TargetSummary>;

/// One of the caller's own reactions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyReactionResponse {
    pub target_id: Snowflake,
    pub kind: ReactionKind,
    pub emoji: Option<String>,
    pub value: Option<u8>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Comment Responses
// ============================================================================

/// Public projection of a comment. No address hash, agent, or risk score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Snowflake,
    pub target_id: Snowflake,
    pub name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health of each backing store
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub cooldown: String,
}

fn health_label(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, cooldown_healthy: bool) -> Self {
        let all_healthy = database_healthy && cooldown_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: health_label(database_healthy),
                cooldown: health_label(cooldown_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
