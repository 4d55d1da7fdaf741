use uuid::Uuid;

use super::CharacterService;
use super::dto::{LevelPrice, LevelUpOutcome};
use crate::cache::keys::{character_level_key, character_profile_key};
use crate::error::CharacterError;

/// 升级的支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPath {
    /// 扣除金币
    Coins { price: i64 },
    /// 邀请人数达到要求，免费升级
    Free,
}

impl PaymentPath {
    /// 金币优先：余额足够时付金币，否则邀请人数足够时免费，都不满足返回 `None`
    pub fn decide(price: &LevelPrice, balance: i64, referrals: i64) -> Option<Self> {
        if balance >= price.coins_price {
            Some(PaymentPath::Coins {
                price: price.coins_price,
            })
        } else if referrals >= price.referrals_to_open {
            Some(PaymentPath::Free)
        } else {
            None
        }
    }
}

impl CharacterService {
    /// 角色升级
    ///
    /// 流程：读取当前等级 -> 查下一级价格 -> 并发查询余额与邀请人数 ->
    /// 决定支付方式 -> 冻结金额、提升等级、确认支付 -> 刷新缓存。
    /// 缓存刷新失败只记录日志，不影响升级结果。
    /// 提升等级失败时释放冻结；等级已提升但确认支付失败时仍返回成功，
    /// 并通过 `settlement_pending` 与错误日志交给对账处理。
    pub async fn level_up_character(&self, user_id: i64) -> Result<LevelUpOutcome, CharacterError> {
        let current_level = self.get_character_level(user_id).await.map_err(|e| {
            tracing::error!("Failed to get level of user {}: {}", user_id, e);
            CharacterError::LevelUnavailable(Box::new(e))
        })?;

        let prices = self.get_level_prices().await?;
        let next_level = current_level + 1;
        let price = prices
            .price_for(next_level)
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("No price for level {}, user {} is at max level", next_level, user_id);
                CharacterError::NoFurtherLevels { current_level }
            })?;

        let (balance, referrals) = tokio::try_join!(
            self.payments.coins_balance(user_id),
            self.payments.referrals_count(user_id)
        )
        .map_err(|e| {
            tracing::error!("Failed to get balance of user {}: {}", user_id, e);
            CharacterError::from(e)
        })?;

        let path = PaymentPath::decide(&price, balance, referrals).ok_or_else(|| {
            tracing::info!(
                "User {} cannot afford level {}: {} coins, {} referrals",
                user_id,
                next_level,
                balance,
                referrals
            );
            CharacterError::InsufficientFunds {
                next_level,
                coins_price: price.coins_price,
                balance,
                referrals_to_open: price.referrals_to_open,
                referrals,
            }
        })?;

        // 提交阶段（含缓存刷新）在独立任务中执行，请求被取消也会完整跑完，
        // 不会留下没有结算的冻结，也不会让缓存里的等级落后于存储
        let (new_level, settlement_pending) =
            tokio::spawn(self.clone().commit_level_up(user_id, current_level, path))
                .await
                .map_err(|e| CharacterError::Internal(format!("level-up task failed: {}", e)))?
                .map_err(|e| {
                    tracing::error!("Failed to level up user {}: {}", user_id, e);
                    e
                })?;

        let coins_balance = match path {
            PaymentPath::Coins { price } => balance - price,
            PaymentPath::Free => balance,
        };

        tracing::info!("User {} leveled up to {}", user_id, new_level);
        Ok(LevelUpOutcome {
            new_level,
            coins_balance,
            settlement_pending,
        })
    }

    /// 提升等级并刷新缓存，返回新等级与是否待对账
    async fn commit_level_up(
        self,
        user_id: i64,
        from_level: i32,
        path: PaymentPath,
    ) -> Result<(i32, bool), CharacterError> {
        let upgraded = match path {
            PaymentPath::Coins { price } => {
                self.settle_paid_level_up(user_id, from_level, price, Uuid::new_v4())
                    .await
            }
            PaymentPath::Free => {
                tracing::info!("User {} levels up for free by referrals", user_id);
                self.store
                    .increment_level(user_id, from_level)
                    .await
                    .map(|new_level| (new_level, false))
                    .map_err(CharacterError::from)
            }
        };

        match &upgraded {
            Ok((new_level, _)) => {
                self.cache
                    .store(&character_level_key(user_id), new_level, self.cache.lifetime())
                    .await;
                self.cache.evict(&character_profile_key(user_id)).await;
            }
            Err(CharacterError::LevelConflict(_)) => {
                // 缓存里的等级已经过时，下一次从存储重新读取
                self.cache.evict(&character_level_key(user_id)).await;
            }
            Err(_) => {}
        }

        upgraded
    }

    /// 付费升级：冻结、提升等级、确认支付
    async fn settle_paid_level_up(
        &self,
        user_id: i64,
        from_level: i32,
        price: i64,
        payment_id: Uuid,
    ) -> Result<(i32, bool), CharacterError> {
        tracing::info!(
            "Initiating payment {} of {} coins for user {}",
            payment_id,
            price,
            user_id
        );

        if let Err(e) = self.payments.initiate_payment(user_id, price, payment_id).await {
            tracing::error!("Failed to initiate payment {}: {}", payment_id, e);
            // 超时等情况下无法确认是否已冻结，主动释放
            if e.is_ambiguous() {
                if let Err(release_err) = self.payments.finalize_payment(payment_id, false).await {
                    tracing::error!(
                        "Failed to release ambiguous payment {}: {}",
                        payment_id,
                        release_err
                    );
                }
            }
            return Err(e.into());
        }

        let new_level = match self.store.increment_level(user_id, from_level).await {
            Ok(new_level) => new_level,
            Err(e) => {
                tracing::warn!(
                    "Level increment failed for user {}, releasing payment {}: {}",
                    user_id,
                    payment_id,
                    e
                );
                if let Err(release_err) = self.payments.finalize_payment(payment_id, false).await {
                    tracing::error!("Failed to release payment {}: {}", payment_id, release_err);
                }
                return Err(e.into());
            }
        };

        let settlement_pending = match self.payments.finalize_payment(payment_id, true).await {
            Ok(()) => false,
            Err(e) => {
                tracing::error!(
                    "User {} reached level {} but payment {} was not finalized, needs reconciliation: {}",
                    user_id,
                    new_level,
                    payment_id,
                    e
                );
                true
            }
        };

        Ok((new_level, settlement_pending))
    }
}
