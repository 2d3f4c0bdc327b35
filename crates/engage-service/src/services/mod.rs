//! Business logic services
//!
//! Reaction writes and their aggregate recompute, the comment listing and
//! creation path, and the abuse gates that guard it.

pub mod abuse;
pub mod aggregate;
pub mod comment;
pub mod context;
pub mod error;
pub mod rate_limit;
pub mod reaction;
pub mod reconcile;
pub mod risk;

pub use abuse::{AbuseGuard, Clearance, ClientInfo, Submitter};
pub use aggregate::AggregateService;
pub use comment::{CommentService, CreatedComment};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{RateLimitRejection, ServiceError, ServiceResult};
pub use rate_limit::{RateLimitInfo, SlidingWindowLimiter};
pub use reaction::{Breakdown, RatingOutcome, ReactionOutcome, ReactionService};
pub use reconcile::{AggregateReconciler, ReconcileReport};
pub use risk::RecaptchaVerifier;
