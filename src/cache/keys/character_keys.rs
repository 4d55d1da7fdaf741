/// 角色等级缓存键前缀
const CHARACTER_LEVEL_PREFIX: &str = "level:";

/// 角色资料缓存键前缀
const CHARACTER_PROFILE_PREFIX: &str = "profile:";

/// 全部皮肤目录（全局）
pub const ALL_SKINS_KEY: &str = "all-skins";

/// 等级价格表（全局）
pub const LEVEL_PRICES_KEY: &str = "level-prices";

/// 生成角色等级缓存键
pub fn character_level_key(user_id: i64) -> String {
    format!("{}{}", CHARACTER_LEVEL_PREFIX, user_id)
}

/// 生成角色资料缓存键
pub fn character_profile_key(user_id: i64) -> String {
    format!("{}{}", CHARACTER_PROFILE_PREFIX, user_id)
}
