use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use super::ProgressionCache;

/// 角色数据缓存操作
///
/// 所有写入都是尽力而为：失败只记录日志，从不让请求失败。
/// 读取时缓存故障等同于未命中，请求会降级为直接查库。
#[derive(Clone)]
pub struct CharacterCache {
    backend: Arc<dyn ProgressionCache>,
    lifetime: Duration,
    level_prices_lifetime: Duration,
}

impl CharacterCache {
    pub fn new(
        backend: Arc<dyn ProgressionCache>,
        lifetime: Duration,
        level_prices_lifetime: Duration,
    ) -> Self {
        Self {
            backend,
            lifetime,
            level_prices_lifetime,
        }
    }

    /// 角色等级、角色资料与皮肤目录的过期时间
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// 等级价格表的过期时间
    pub fn level_prices_lifetime(&self) -> Duration {
        self.level_prices_lifetime
    }

    /// 读取并反序列化缓存值
    pub async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get(key).await {
            Ok(Some(json)) => match serde_json::from_str::<T>(&json) {
                Ok(value) => {
                    tracing::debug!("Cache hit: {}", key);
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                tracing::debug!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                tracing::error!("Cache unavailable while reading {}: {}", key, e);
                None
            }
        }
    }

    /// 序列化后写入缓存
    pub async fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        match self.backend.set(key, json, ttl).await {
            Ok(()) => tracing::debug!("Set cache entry: {}", key),
            Err(e) => tracing::error!("Failed to write cache entry {}: {}", key, e),
        }
    }

    /// 删除缓存键
    pub async fn evict(&self, key: &str) {
        if let Err(e) = self.backend.invalidate(key).await {
            tracing::error!("Failed to invalidate cache entry {}: {}", key, e);
        }
    }

    /// 读穿透：命中直接返回，未命中则调用 `load` 并回填缓存
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &str, ttl: Duration, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fetch(key).await {
            return Ok(value);
        }

        let value = load().await?;
        self.store(key, &value, ttl).await;
        Ok(value)
    }
}
