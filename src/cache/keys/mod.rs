/// 缓存键模块

pub mod character_keys;

pub use character_keys::{ALL_SKINS_KEY, LEVEL_PRICES_KEY, character_level_key, character_profile_key};
