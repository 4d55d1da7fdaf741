use sqlx::FromRow;

use crate::services::character::dto::{CharacterProfile, LevelPrice, Skin, SkinStats};

/// 角色资料查询结果（characters 左连接 character_skins 与 character_levels）
#[derive(Debug, FromRow)]
pub struct CharacterProfileEntity {
    pub current_level: i32,
    pub skin_id: Option<i32>,
    pub character_name: Option<String>,
    pub character_image_url: Option<String>,
    pub mining_force: Option<i64>,
    pub mining_duration_minutes: Option<i32>,
}

impl From<CharacterProfileEntity> for CharacterProfile {
    fn from(entity: CharacterProfileEntity) -> Self {
        Self {
            skin_name: entity.character_name.unwrap_or_default(),
            current_level: entity.current_level,
            mining_rate: entity.mining_force.unwrap_or_default(),
            mining_duration: entity.mining_duration_minutes.unwrap_or_default(),
            current_skin_id: entity.skin_id.unwrap_or_default(),
            skin_image_url: entity.character_image_url.unwrap_or_default(),
        }
    }
}

/// 皮肤数据库实体，价格取自解锁等级对应的价格行
#[derive(Debug, FromRow)]
pub struct SkinEntity {
    pub skin_id: i32,
    pub character_name: String,
    pub character_lore: String,
    pub character_image_url: String,
    pub unlock_level: i32,
    pub price: Option<i64>,
    pub referrals: Option<i64>,
    pub referral_to_open: Option<i64>,
}

impl From<SkinEntity> for Skin {
    fn from(entity: SkinEntity) -> Self {
        Self {
            skin_id: entity.skin_id,
            name: entity.character_name,
            lore: entity.character_lore,
            image_url: entity.character_image_url,
            unlock_level: entity.unlock_level,
            price: entity.price.unwrap_or_default(),
            referrals_to_buy: entity.referrals.unwrap_or_default(),
            referrals_to_open: entity.referral_to_open.unwrap_or_default(),
            is_opened: false,
            stats: SkinStats::default(),
        }
    }
}

/// 等级价格数据库实体
#[derive(Debug, FromRow)]
pub struct LevelPriceEntity {
    pub level_number: i32,
    pub price: i64,
    pub referrals: i64,
    pub referral_to_open: i64,
}

impl From<LevelPriceEntity> for LevelPrice {
    fn from(entity: LevelPriceEntity) -> Self {
        Self {
            level: entity.level_number,
            coins_price: entity.price,
            referrals_price: entity.referrals,
            referrals_to_open: entity.referral_to_open,
        }
    }
}
