// 数据库模块
// 包含数据库实体定义和存储库操作

pub mod models; // 数据库实体定义
pub mod repositories; // 存储库实现

pub use repositories::character::{CharacterRepository, CharacterStore};

/// 启动时执行的内嵌迁移
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
