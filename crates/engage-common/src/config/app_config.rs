//! Application configuration structs
//!
//! Loads configuration from environment variables (with `.env` support).

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub actor: ActorCookieConfig,
    pub comments: CommentConfig,
    pub risk: RiskConfig,
    pub reconcile: ReconcileConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            other => Err(other.to_string()),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Peers whose forwarding headers name the real client
    pub trusted_proxies: Vec<IpAddr>,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token validation
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
}

/// Global per-IP request governor
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

/// Signed guest-identity cookie
#[derive(Debug, Clone, Deserialize)]
pub struct ActorCookieConfig {
    pub cookie_name: String,
    pub secret: String,
    pub secure: bool,
    pub max_age_days: i64,
}

/// Where cooldown stamps live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CooldownBackend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for CooldownBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(other.to_string()),
        }
    }
}

/// Comment limits and abuse-gate tuning
#[derive(Debug, Clone, Deserialize)]
pub struct CommentConfig {
    pub min_length: usize,
    pub max_length: usize,
    pub max_links: usize,
    pub cooldown_seconds: u64,
    pub rate_limit_max: usize,
    pub rate_limit_window_seconds: u64,
    pub duplicate_window_seconds: i64,
    pub page_size: u32,
    pub max_page_size: u32,
    pub auto_publish: bool,
    pub ip_hash_salt: String,
    pub cooldown_backend: CooldownBackend,
}

impl CommentConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 2000,
            max_links: 2,
            cooldown_seconds: 20,
            rate_limit_max: 5,
            rate_limit_window_seconds: 600,
            duplicate_window_seconds: 120,
            page_size: 20,
            max_page_size: 50,
            auto_publish: true,
            ip_hash_salt: String::new(),
            cooldown_backend: CooldownBackend::Memory,
        }
    }
}

/// External risk-assessment provider (reCAPTCHA Enterprise style)
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    pub enabled: bool,
    pub project_id: String,
    pub api_key: String,
    pub site_key: String,
    pub expected_action: Option<String>,
    pub min_score: f64,
    pub timeout_ms: u64,
    pub endpoint: String,
}

impl RiskConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project_id: String::new(),
            api_key: String::new(),
            site_key: String::new(),
            expected_action: None,
            min_score: 0.5,
            timeout_ms: 3000,
            endpoint: default_risk_endpoint(),
        }
    }
}

/// Background aggregate reconciliation
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    /// Zero disables the job
    pub interval_seconds: u64,
    pub batch_size: i64,
}

impl ReconcileConfig {
    pub fn is_enabled(&self) -> bool {
        self.interval_seconds > 0
    }
}

// Default value functions
fn default_app_name() -> String {
    "engage-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_risk_endpoint() -> String {
    "https://recaptchaenterprise.googleapis.com".to_string()
}

fn default_cookie_name() -> String {
    "eid".to_string()
}

/// Reads variables through a lookup function so tests can feed a map
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn string_or(&self, key: &str, default: impl FnOnce() -> String) -> String {
        self.get(key).unwrap_or_else(default)
    }

    fn parse_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(default),
        }
    }

    fn parse_list<T: FromStr>(&self, key: &'static str) -> Result<Vec<T>, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse()
                    .map_err(|_| ConfigError::InvalidValue(key, item.to_owned()))
            })
            .collect()
    }

    fn parse_required<T: FromStr>(&self, key: &'static str) -> Result<T, ConfigError> {
        let raw = self.required(key)?;
        raw.trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw))
    }

    fn flag_or(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue(key, raw)),
            },
            None => Ok(default),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an explicit map of variables
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let comment_defaults = CommentConfig::default();
        let risk_defaults = RiskConfig::default();

        let config = Self {
            app: AppSettings {
                name: vars.string_or("APP_NAME", default_app_name),
                env: vars
                    .get("APP_ENV")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: vars.string_or("API_HOST", default_host),
                port: vars.parse_required("API_PORT")?,
                trusted_proxies: vars.parse_list("TRUSTED_PROXIES")?,
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
                min_connections: vars.parse_or("DATABASE_MIN_CONNECTIONS", 5)?,
                run_migrations: vars.flag_or("DATABASE_RUN_MIGRATIONS", true)?,
            },
            redis: match vars.get("REDIS_URL") {
                Some(url) => Some(RedisConfig {
                    url,
                    max_connections: vars.parse_or("REDIS_MAX_CONNECTIONS", 10)?,
                }),
                None => None,
            },
            jwt: JwtConfig {
                secret: vars.required("JWT_SECRET")?,
                access_token_expiry: vars.parse_or("JWT_ACCESS_TOKEN_EXPIRY", 900)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars.parse_or("RATE_LIMIT_REQUESTS_PER_SECOND", 10)?,
                burst: vars.parse_or("RATE_LIMIT_BURST", 50)?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: vars.parse_or("WORKER_ID", 0)?,
            },
            actor: ActorCookieConfig {
                cookie_name: vars.string_or("ACTOR_COOKIE_NAME", default_cookie_name),
                secret: vars.required("ACTOR_COOKIE_SECRET")?,
                secure: vars.flag_or("ACTOR_COOKIE_SECURE", true)?,
                max_age_days: vars.parse_or("ACTOR_COOKIE_MAX_AGE_DAYS", 365)?,
            },
            comments: CommentConfig {
                min_length: vars.parse_or("COMMENT_MIN_LENGTH", comment_defaults.min_length)?,
                max_length: vars.parse_or("COMMENT_MAX_LENGTH", comment_defaults.max_length)?,
                max_links: vars.parse_or("COMMENT_MAX_LINKS", comment_defaults.max_links)?,
                cooldown_seconds: vars
                    .parse_or("COMMENT_COOLDOWN_SECONDS", comment_defaults.cooldown_seconds)?,
                rate_limit_max: vars
                    .parse_or("COMMENT_RATE_LIMIT_MAX", comment_defaults.rate_limit_max)?,
                rate_limit_window_seconds: vars.parse_or(
                    "COMMENT_RATE_LIMIT_WINDOW_SECONDS",
                    comment_defaults.rate_limit_window_seconds,
                )?,
                duplicate_window_seconds: vars.parse_or(
                    "COMMENT_DUPLICATE_WINDOW_SECONDS",
                    comment_defaults.duplicate_window_seconds,
                )?,
                page_size: vars.parse_or("COMMENT_PAGE_SIZE", comment_defaults.page_size)?,
                max_page_size: vars
                    .parse_or("COMMENT_MAX_PAGE_SIZE", comment_defaults.max_page_size)?,
                auto_publish: vars.flag_or("COMMENT_AUTO_PUBLISH", comment_defaults.auto_publish)?,
                ip_hash_salt: vars.get("COMMENT_IP_HASH_SALT").unwrap_or_default(),
                cooldown_backend: vars.parse_or("COOLDOWN_BACKEND", CooldownBackend::Memory)?,
            },
            risk: RiskConfig {
                enabled: vars.flag_or("RISK_ENABLED", false)?,
                project_id: vars.get("RISK_PROJECT_ID").unwrap_or_default(),
                api_key: vars.get("RISK_API_KEY").unwrap_or_default(),
                site_key: vars.get("RISK_SITE_KEY").unwrap_or_default(),
                expected_action: vars.get("RISK_EXPECTED_ACTION"),
                min_score: vars.parse_or("RISK_MIN_SCORE", risk_defaults.min_score)?,
                timeout_ms: vars.parse_or("RISK_TIMEOUT_MS", risk_defaults.timeout_ms)?,
                endpoint: vars.string_or("RISK_ENDPOINT", default_risk_endpoint),
            },
            reconcile: ReconcileConfig {
                interval_seconds: vars.parse_or("AGGREGATE_RECONCILE_INTERVAL_SECONDS", 0)?,
                batch_size: vars.parse_or("AGGREGATE_RECONCILE_BATCH", 200)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that cannot be expressed per variable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.comments.min_length > self.comments.max_length {
            return Err(ConfigError::InvalidValue(
                "COMMENT_MIN_LENGTH",
                format!(
                    "{} exceeds COMMENT_MAX_LENGTH {}",
                    self.comments.min_length, self.comments.max_length
                ),
            ));
        }
        if self.comments.cooldown_backend == CooldownBackend::Redis && self.redis.is_none() {
            return Err(ConfigError::MissingVar("REDIS_URL"));
        }
        if self.risk.enabled {
            if self.risk.project_id.is_empty() {
                return Err(ConfigError::MissingVar("RISK_PROJECT_ID"));
            }
            if self.risk.api_key.is_empty() {
                return Err(ConfigError::MissingVar("RISK_API_KEY"));
            }
            if self.risk.site_key.is_empty() {
                return Err(ConfigError::MissingVar("RISK_SITE_KEY"));
            }
        }
        if !(0.0..=1.0).contains(&self.risk.min_score) {
            return Err(ConfigError::InvalidValue(
                "RISK_MIN_SCORE",
                self.risk.min_score.to_string(),
            ));
        }
        if self.comments.max_page_size == 0 || self.reconcile.batch_size <= 0 {
            return Err(ConfigError::InvalidValue(
                "COMMENT_MAX_PAGE_SIZE",
                "page and batch sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
