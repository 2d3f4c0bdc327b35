//! Response types and error handling for API endpoints
//!
//! Every error renders as `{"error": {"code", "message", "details"?}}` where
//! `message` is the short machine reason (`duplicate_comment`, ...).

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, IntoResponseParts, Response, ResponseParts},
    Json,
};
use engage_common::AppError;
use engage_core::DomainError;
use engage_service::{RateLimitInfo, ServiceError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use validator::ValidationErrors;

pub const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
pub const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
pub const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation needs an identity the request did not carry
    #[error("Actor required")]
    ActorRequired,

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::App(e) => StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Service(e) => StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Domain(e) => {
                if e.is_not_found() {
                    StatusCode::NOT_FOUND
                } else if e.is_validation() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            Self::Validation(_) | Self::InvalidPath(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::ActorRequired => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::Validation(_) | Self::InvalidRequest(_) => "VALIDATION_ERROR",
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::ActorRequired => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Machine reason sent as the message
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::App(e) => e.reason(),
            Self::Service(e) => e.reason(),
            Self::Domain(e) => e.reason().into_owned(),
            Self::Validation(errors) => first_violation(errors),
            Self::InvalidPath(reason) | Self::InvalidRequest(reason) => reason.clone(),
            Self::ActorRequired => "actor_required".to_string(),
            Self::Internal(_) => "internal_error".to_string(),
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Self::InvalidPath(reason.into())
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }
}

/// Message of the alphabetically first failing field, so the reason is stable
fn first_violation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .first()
        .map_or_else(
            || "invalid_request".to_string(),
            |(field, errs)| {
                errs.first()
                    .and_then(|e| e.message.as_ref())
                    .map_or_else(|| format!("invalid_{field}"), ToString::to_string)
            },
        )
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error detail for API responses
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();
        let message = self.reason();

        if status.is_server_error() {
            error!(error = ?self, "Server error occurred");
        } else {
            debug!(status = status.as_u16(), reason = %message, "Request rejected");
        }

        let details = if let Self::Validation(errors) = &self {
            Some(serde_json::to_value(errors).unwrap_or_default())
        } else {
            None
        };

        let mut headers = HeaderMap::new();
        if let Self::Service(e) = &self {
            if let Some(rejection) = e.rate_limit() {
                headers.insert(header::RETRY_AFTER, HeaderValue::from(rejection.retry_after_secs));
                if let Some(quota) = rejection.quota {
                    insert_quota(&mut headers, quota);
                }
            }
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };

        (status, headers, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Created response (201) with JSON body
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        *response.status_mut() = StatusCode::CREATED;
        response
    }
}

/// `RateLimit-*` headers describing the caller's remaining comment quota
pub struct QuotaHeaders(pub RateLimitInfo);

impl IntoResponseParts for QuotaHeaders {
    type Error = std::convert::Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        insert_quota(res.headers_mut(), self.0);
        Ok(res)
    }
}

fn insert_quota(headers: &mut HeaderMap, quota: RateLimitInfo) {
    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(quota.limit));
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(quota.remaining));
    headers.insert(RATELIMIT_RESET, HeaderValue::from(quota.reset_after_secs));
}
