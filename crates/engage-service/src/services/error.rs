//! Service layer error types
//!
//! Every variant carries a short machine reason (`duplicate_comment`,
//! `cooldown_active_15s`, ...) that becomes the response message.

use engage_core::DomainError;
use std::fmt;

use super::rate_limit::RateLimitInfo;

/// A 429 from the comment gates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRejection {
    pub reason: String,
    pub retry_after_secs: u64,
    /// Window counters, present for the sliding-window limiter only
    pub quota: Option<RateLimitInfo>,
}

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or repository failure
    Domain(DomainError),

    NotFound { resource: &'static str, id: String },

    Validation(String),

    /// Rejected identity or risk verdict
    Unauthorized(String),

    Conflict(String),

    RateLimited(RateLimitRejection),

    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(reason) => write!(f, "Validation error: {reason}"),
            Self::Unauthorized(reason) => write!(f, "Unauthorized: {reason}"),
            Self::Conflict(reason) => write!(f, "Conflict: {reason}"),
            Self::RateLimited(rejection) => write!(f, "Rate limited: {}", rejection.reason),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Cooldown rejection; the hint is the remaining wait in whole seconds
    pub fn cooldown(retry_after_secs: u64) -> Self {
        Self::RateLimited(RateLimitRejection {
            reason: format!("cooldown_active_{retry_after_secs}s"),
            retry_after_secs,
            quota: None,
        })
    }

    /// Sliding-window rejection
    pub fn rate_limited(quota: RateLimitInfo) -> Self {
        Self::RateLimited(RateLimitRejection {
            reason: format!("rate_limited_{}s", quota.reset_after_secs),
            retry_after_secs: quota.reset_after_secs,
            quota: Some(quota),
        })
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_validation() {
                    400
                } else {
                    500
                }
            }
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Conflict(_) => 409,
            Self::RateLimited(_) => 429,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Machine-readable reason shown to clients
    pub fn reason(&self) -> String {
        match self {
            Self::Domain(e) => e.reason().into_owned(),
            Self::NotFound { resource, .. } => format!("{resource}_not_found"),
            Self::Validation(reason) | Self::Unauthorized(reason) | Self::Conflict(reason) => {
                reason.clone()
            }
            Self::RateLimited(rejection) => rejection.reason.clone(),
            Self::Internal(_) => "internal_error".to_string(),
        }
    }

    pub fn rate_limit(&self) -> Option<&RateLimitRejection> {
        match self {
            Self::RateLimited(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
