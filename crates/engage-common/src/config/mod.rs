//! Configuration structs

mod app_config;

pub use app_config::{
    ActorCookieConfig, AppConfig, AppSettings, CommentConfig, ConfigError, CooldownBackend,
    CorsConfig, DatabaseConfig, Environment, JwtConfig, RateLimitConfig, ReconcileConfig,
    RedisConfig, RiskConfig, ServerConfig, SnowflakeConfig,
};
