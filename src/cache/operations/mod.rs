/// 缓存操作
/// 底层键值接口与 Redis 实现，以及面向角色数据的类型化封装

pub mod character;
pub mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

pub use character::CharacterCache;
pub use redis_cache::RedisCache;

/// 键值缓存接口
///
/// `get` 在键不存在时返回 `Ok(None)`，只有基础设施故障才返回 `Err`，
/// 调用方据此区分“未命中，去查库”与“缓存不可用，记录日志后照样查库”。
#[async_trait]
pub trait ProgressionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}
