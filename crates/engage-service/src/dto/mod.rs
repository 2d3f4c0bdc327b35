//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    parse_target_id, parse_target_ids, CommentListQuery, CreateCommentRequest, MyReactionsQuery,
    RateRequest, SetReactionRequest, SummaryQuery, TargetIdInput, ToggleReactionRequest,
    MAX_TARGET_IDS,
};

pub use responses::{
    ApiResponse, CommentResponse, HealthChecks, HealthResponse, MyReactionResponse, PageMeta,
    PaginatedResponse, RatingResponse, ReactionStateResponse, ReadinessResponse, SummaryResponse,
    TargetSummary,
};
