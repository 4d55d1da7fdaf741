use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::character::{CharacterProfileEntity, LevelPriceEntity, SkinEntity};
use crate::error::StoreError;
use crate::services::character::dto::{CharacterProfile, LevelPrice, Skin};

/// 角色存储接口，存储是等级与皮肤的唯一可信来源
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// 创建角色，重复创建不报错
    async fn create_character(&self, user_id: i64) -> Result<(), StoreError>;

    async fn character_level(&self, user_id: i64) -> Result<i32, StoreError>;

    async fn character_profile(&self, user_id: i64) -> Result<CharacterProfile, StoreError>;

    async fn all_skins(&self) -> Result<Vec<Skin>, StoreError>;

    async fn all_level_prices(&self) -> Result<Vec<LevelPrice>, StoreError>;

    /// 原子地把等级从 `from_level` 提升一级并返回新等级。
    /// 存储中的等级已变化时返回 `StoreError::LevelConflict`，不做任何修改。
    async fn increment_level(&self, user_id: i64, from_level: i32) -> Result<i32, StoreError>;

    async fn set_active_skin(&self, user_id: i64, skin_id: i32) -> Result<(), StoreError>;
}

/// Postgres 角色存储库
pub struct CharacterRepository {
    pool: PgPool,
}

impl CharacterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn character_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM characters WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl CharacterStore for CharacterRepository {
    async fn create_character(&self, user_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO characters (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!("Character {} already exists", user_id);
        }
        Ok(())
    }

    async fn character_level(&self, user_id: i64) -> Result<i32, StoreError> {
        let level: Option<i32> =
            sqlx::query_scalar("SELECT current_level FROM characters WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        level.ok_or(StoreError::CharacterNotFound { user_id })
    }

    async fn character_profile(&self, user_id: i64) -> Result<CharacterProfile, StoreError> {
        let entity = sqlx::query_as::<_, CharacterProfileEntity>(
            r#"
            SELECT
                c.current_level,
                s.skin_id,
                s.character_name,
                s.character_image_url,
                l.mining_force,
                l.mining_duration_minutes
            FROM characters c
            LEFT JOIN character_skins s ON c.current_skin_id = s.skin_id
            LEFT JOIN character_levels l ON c.current_level = l.level_number
            WHERE c.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        entity
            .map(CharacterProfile::from)
            .ok_or(StoreError::CharacterNotFound { user_id })
    }

    async fn all_skins(&self) -> Result<Vec<Skin>, StoreError> {
        let skins = sqlx::query_as::<_, SkinEntity>(
            r#"
            SELECT
                s.skin_id,
                s.character_name,
                s.character_lore,
                s.character_image_url,
                s.unlock_level,
                l.price,
                l.referrals,
                l.referral_to_open
            FROM character_skins s
            LEFT JOIN character_levels l ON s.unlock_level = l.level_number
            ORDER BY s.unlock_level, s.skin_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(skins.into_iter().map(Skin::from).collect())
    }

    async fn all_level_prices(&self) -> Result<Vec<LevelPrice>, StoreError> {
        let prices = sqlx::query_as::<_, LevelPriceEntity>(
            r#"
            SELECT level_number, price, referrals, referral_to_open
            FROM character_levels
            ORDER BY level_number ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(prices.into_iter().map(LevelPrice::from).collect())
    }

    async fn increment_level(&self, user_id: i64, from_level: i32) -> Result<i32, StoreError> {
        // 单条条件更新：并发升级时只有一个请求能从 from_level 升上去
        let new_level: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE characters
            SET current_level = current_level + 1
            WHERE user_id = $1 AND current_level = $2
            RETURNING current_level
            "#,
        )
        .bind(user_id)
        .bind(from_level)
        .fetch_optional(&self.pool)
        .await?;

        match new_level {
            Some(level) => Ok(level),
            None if self.character_exists(user_id).await? => Err(StoreError::LevelConflict {
                user_id,
                expected_level: from_level,
            }),
            None => Err(StoreError::CharacterNotFound { user_id }),
        }
    }

    async fn set_active_skin(&self, user_id: i64, skin_id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE characters SET current_skin_id = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(skin_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::CharacterNotFound { user_id });
        }
        Ok(())
    }
}
