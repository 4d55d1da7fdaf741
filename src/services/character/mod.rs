//! 角色成长服务：等级、资料、皮肤的读穿透读取，以及升级流程

pub mod dto;
mod level_up;

use std::sync::Arc;

use crate::cache::CharacterCache;
use crate::cache::keys::{ALL_SKINS_KEY, LEVEL_PRICES_KEY, character_level_key, character_profile_key};
use crate::clients::PaymentGateway;
use crate::database::CharacterStore;
use crate::error::CharacterError;

use dto::{CharacterProfile, LevelPriceList, SkinList};

pub use level_up::PaymentPath;

/// 角色服务
///
/// 存储、缓存、支付网关都通过构造函数注入，测试时可以替换成内存实现。
#[derive(Clone)]
pub struct CharacterService {
    store: Arc<dyn CharacterStore>,
    cache: CharacterCache,
    payments: Arc<dyn PaymentGateway>,
}

impl CharacterService {
    pub fn new(
        store: Arc<dyn CharacterStore>,
        cache: CharacterCache,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            store,
            cache,
            payments,
        }
    }

    /// 创建角色，重复创建视为成功
    pub async fn create_character(&self, user_id: i64) -> Result<(), CharacterError> {
        tracing::info!("Creating character for user {}", user_id);

        self.store.create_character(user_id).await.map_err(|e| {
            tracing::error!("Failed to create character for user {}: {}", user_id, e);
            CharacterError::from(e)
        })?;

        tracing::info!("Character created for user {}", user_id);
        Ok(())
    }

    /// 获取角色当前等级
    pub async fn get_character_level(&self, user_id: i64) -> Result<i32, CharacterError> {
        let key = character_level_key(user_id);
        self.cache
            .get_or_load(&key, self.cache.lifetime(), || async {
                self.store.character_level(user_id).await.map_err(|e| {
                    tracing::error!("Failed to load level of user {}: {}", user_id, e);
                    CharacterError::from(e)
                })
            })
            .await
    }

    /// 获取角色资料
    pub async fn get_character(&self, user_id: i64) -> Result<CharacterProfile, CharacterError> {
        let key = character_profile_key(user_id);
        self.cache
            .get_or_load(&key, self.cache.lifetime(), || async {
                self.store.character_profile(user_id).await.map_err(|e| {
                    tracing::error!("Failed to load character of user {}: {}", user_id, e);
                    CharacterError::from(e)
                })
            })
            .await
    }

    /// 获取全部皮肤，并按用户当前等级标记开放状态
    ///
    /// 等级与皮肤目录并发读取；任一失败则整体失败，另一个分支随之取消。
    pub async fn get_skins(&self, user_id: i64) -> Result<SkinList, CharacterError> {
        let (level, mut skins) =
            tokio::try_join!(self.get_character_level(user_id), self.skin_catalog())?;

        skins.update_open_status(level);
        Ok(skins)
    }

    /// 获取等级价格表
    pub async fn get_level_prices(&self) -> Result<LevelPriceList, CharacterError> {
        self.cache
            .get_or_load(LEVEL_PRICES_KEY, self.cache.level_prices_lifetime(), || async {
                self.store
                    .all_level_prices()
                    .await
                    .map(LevelPriceList::new)
                    .map_err(|e| {
                        tracing::error!("Failed to load level prices: {}", e);
                        CharacterError::from(e)
                    })
            })
            .await
    }

    /// 切换当前使用的皮肤，只能切换到已开放的皮肤
    pub async fn change_active_skin(&self, user_id: i64, skin_id: i32) -> Result<(), CharacterError> {
        let skins = self.get_skins(user_id).await?;

        match skins.is_opened(skin_id) {
            None => return Err(CharacterError::SkinNotFound { skin_id }),
            Some(false) => return Err(CharacterError::SkinNotOpened { skin_id }),
            Some(true) => {}
        }

        self.store
            .set_active_skin(user_id, skin_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to change active skin of user {} to {}: {}",
                    user_id,
                    skin_id,
                    e
                );
                CharacterError::from(e)
            })?;

        // 资料里带有皮肤信息，删掉让下次读取回源
        self.cache.evict(&character_profile_key(user_id)).await;

        tracing::info!("User {} changed active skin to {}", user_id, skin_id);
        Ok(())
    }

    /// 皮肤目录（不含开放状态）
    async fn skin_catalog(&self) -> Result<SkinList, CharacterError> {
        self.cache
            .get_or_load(ALL_SKINS_KEY, self.cache.lifetime(), || async {
                self.store.all_skins().await.map(SkinList::new).map_err(|e| {
                    tracing::error!("Failed to load skins: {}", e);
                    CharacterError::from(e)
                })
            })
            .await
    }
}
