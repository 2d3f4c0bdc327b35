//! # engage-db
//!
//! PostgreSQL implementations of the repository traits defined in `engage-core`.
//!
//! - Connection pool management
//! - Idempotent schema setup
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use engage_db::{create_pool, migrate, PgReactionRepository, PoolSettings};
//!
//! async fn example(config: &engage_common::DatabaseConfig) -> Result<(), sqlx::Error> {
//!     let pool = create_pool(&PoolSettings::from(config)).await?;
//!     migrate(&pool).await?;
//!     let reactions = PgReactionRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod migrate;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use migrate::migrate;
pub use pool::{create_pool, PgPool, PoolSettings};
pub use repositories::{PgCommentRepository, PgReactionRepository, PgTargetRepository};
