use serde::{Deserialize, Serialize};

/// 角色资料（含展示字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub skin_name: String,
    pub current_level: i32,
    pub mining_rate: i64,
    pub mining_duration: i32,
    pub current_skin_id: i32,
    pub skin_image_url: String,
}

/// 某一等级的价格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelPrice {
    pub level: i32,
    pub coins_price: i64,
    pub referrals_price: i64,
    pub referrals_to_open: i64,
}

/// 等级价格表，按等级升序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelPriceList {
    pub levels: Vec<LevelPrice>,
}

impl LevelPriceList {
    pub fn new(mut levels: Vec<LevelPrice>) -> Self {
        levels.sort_by_key(|price| price.level);
        Self { levels }
    }

    /// 按等级精确查找价格
    pub fn price_for(&self, level: i32) -> Option<&LevelPrice> {
        self.levels.iter().find(|price| price.level == level)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinStats {
    pub games_played: i32,
    pub hours_played: i32,
    pub coins_earned: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub skin_id: i32,
    pub name: String,
    pub lore: String,
    pub image_url: String,
    pub unlock_level: i32,
    pub price: i64,
    pub referrals_to_buy: i64,
    pub referrals_to_open: i64,
    /// 派生字段，每次读取后根据当前等级重新计算，从不从缓存恢复
    #[serde(default, skip_deserializing)]
    pub is_opened: bool,
    #[serde(default)]
    pub stats: SkinStats,
}

/// 皮肤目录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinList {
    pub skins: Vec<Skin>,
}

impl SkinList {
    pub fn new(skins: Vec<Skin>) -> Self {
        Self { skins }
    }

    /// 按当前等级重新计算每个皮肤的开放状态
    pub fn update_open_status(&mut self, current_level: i32) {
        for skin in &mut self.skins {
            skin.is_opened = current_level >= skin.unlock_level;
        }
    }

    /// 皮肤不存在时返回 `None`
    pub fn is_opened(&self, skin_id: i32) -> Option<bool> {
        self.skins
            .iter()
            .find(|skin| skin.skin_id == skin_id)
            .map(|skin| skin.is_opened)
    }
}

/// 升级结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelUpOutcome {
    pub new_level: i32,
    /// 升级后的金币余额（本地计算，不重新查询）
    pub coins_balance: i64,
    /// 为真时等级已提升，但支付确认失败，需要对账
    pub settlement_pending: bool,
}
