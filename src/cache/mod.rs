// 缓存模块
// 角色等级、角色资料、皮肤目录与等级价格表的读穿透缓存

pub mod keys;
pub mod operations;

pub use operations::{CharacterCache, ProgressionCache, RedisCache};
