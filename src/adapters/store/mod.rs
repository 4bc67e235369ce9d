//! Candidate Store Adapters
//!
//! - `RedisStore`: production backend (Upstash / any Redis)
//! - `MemoryStore`: in-process backend with Redis ordering semantics

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
