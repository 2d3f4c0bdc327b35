//! Domain errors - error types for the domain layer

use std::borrow::Cow;

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Target not found: {0}")]
    TargetNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    /// Carries a short machine reason such as `text_too_short`
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid target id: {0}")]
    InvalidTargetId(String),

    #[error("Unknown reaction kind: {0}")]
    InvalidReactionKind(String),

    #[error("Emoji is required for EMOJI reactions")]
    EmojiRequired,

    #[error("Invalid emoji")]
    InvalidEmoji,

    #[error("RATING reactions are set through the rate operation")]
    RatingNotToggleable,

    #[error("Malformed actor key: {0}")]
    InvalidActorKey(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Risk-assessment provider unreachable, timed out, or returned garbage
    #[error("Risk provider error: {0}")]
    RiskProviderError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::TargetNotFound(_) => "UNKNOWN_TARGET",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidTargetId(_) => "INVALID_TARGET_ID",
            Self::InvalidReactionKind(_) => "INVALID_REACTION_KIND",
            Self::EmojiRequired => "EMOJI_REQUIRED",
            Self::InvalidEmoji => "INVALID_EMOJI",
            Self::RatingNotToggleable => "RATING_NOT_TOGGLEABLE",
            Self::InvalidActorKey(_) => "INVALID_ACTOR",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::RiskProviderError(_) => "RISK_CHECK_FAILED",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Short snake_case reason surfaced to clients as the error message
    pub fn reason(&self) -> Cow<'static, str> {
        match self {
            Self::TargetNotFound(_) => "target_not_found".into(),
            Self::ValidationError(reason) => reason.clone().into(),
            Self::InvalidTargetId(_) => "invalid_target_id".into(),
            Self::InvalidReactionKind(_) => "invalid_kind".into(),
            Self::EmojiRequired => "emoji_required".into(),
            Self::InvalidEmoji => "invalid_emoji".into(),
            Self::RatingNotToggleable => "use_rate_endpoint".into(),
            Self::InvalidActorKey(_) => "invalid_actor".into(),
            Self::RiskProviderError(_) => "risk_check_failed".into(),
            Self::DatabaseError(_) | Self::CacheError(_) | Self::InternalError(_) => {
                "internal_error".into()
            }
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TargetNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidTargetId(_)
                | Self::InvalidReactionKind(_)
                | Self::EmojiRequired
                | Self::InvalidEmoji
                | Self::RatingNotToggleable
                | Self::InvalidActorKey(_)
        )
    }

    /// Infrastructure failures that map to a 5xx
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::RiskProviderError(_)
                | Self::CacheError(_)
                | Self::InternalError(_)
        )
    }
}
