//! # engage-service
//!
//! Application layer: reaction and comment use cases, the aggregate
//! recompute engine, the abuse gates, and the DTOs the API speaks.

pub mod dto;
pub mod services;

pub use services::{
    AbuseGuard, AggregateReconciler, AggregateService, Breakdown, ClientInfo, CommentService,
    CreatedComment, RateLimitInfo, RateLimitRejection, RatingOutcome, ReactionOutcome,
    ReactionService, RecaptchaVerifier, ReconcileReport, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
