//! Engage Cache - shared state outside the database
//!
//! This crate provides:
//! - Redis connection pooling (deadpool-redis)
//! - Comment cooldown stores: in-process and Redis-backed

pub mod cooldown;
pub mod pool;

pub use cooldown::{MemoryCooldownStore, RedisCooldownStore};
pub use pool::{create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool};
