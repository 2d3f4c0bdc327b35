//! Comment cooldown stores.
//!
//! [`MemoryCooldownStore`] keeps stamps in this process and is only correct
//! behind a single instance. [`RedisCooldownStore`] shares them through Redis.

mod memory;
mod redis_store;

pub use memory::MemoryCooldownStore;
pub use redis_store::RedisCooldownStore;
