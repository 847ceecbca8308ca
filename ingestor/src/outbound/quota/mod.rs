//! Budget counter adapter backed by Redis.

mod redis_store;

pub use redis_store::RedisQuotaStore;
