//! # engage-common
//!
//! Shared utilities: configuration, error handling, session validation, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, JwtService, TokenType};
pub use config::{
    ActorCookieConfig, AppConfig, AppSettings, CommentConfig, ConfigError, CooldownBackend,
    CorsConfig, DatabaseConfig, Environment, JwtConfig, RateLimitConfig, ReconcileConfig,
    RedisConfig, RiskConfig, ServerConfig, SnowflakeConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, TracingConfig, TracingError};
