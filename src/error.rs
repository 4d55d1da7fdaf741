use thiserror::Error;

/// 缓存层错误。调用方只记录日志，不会让请求失败
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 持久化存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("character {user_id} not found")]
    CharacterNotFound { user_id: i64 },

    /// 条件更新没有命中：存储中的等级已经不是 `expected_level`
    #[error("character {user_id} is no longer at level {expected_level}")]
    LevelConflict { user_id: i64, expected_level: i32 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 支付网关（用户服务、推荐服务）错误
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment gateway timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("payment gateway rejected {operation} with status {status}: {message}")]
    Rejected {
        operation: &'static str,
        status: u16,
        message: String,
    },
}

impl PaymentError {
    /// 无法判断远端是否已经执行了请求（超时或连接中断）
    pub fn is_ambiguous(&self) -> bool {
        match self {
            PaymentError::Timeout { .. } => true,
            PaymentError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            PaymentError::Rejected { status, .. } => *status >= 500,
        }
    }
}

/// 错误分类，决定对外返回的状态码与是否可重试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Infrastructure,
    Policy,
    Payment,
    Conflict,
}

#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("character {user_id} not found")]
    CharacterNotFound { user_id: i64 },

    #[error("skin {skin_id} not found")]
    SkinNotFound { skin_id: i32 },

    #[error("cannot determine character level")]
    LevelUnavailable(#[source] Box<CharacterError>),

    #[error("no further levels after level {current_level}")]
    NoFurtherLevels { current_level: i32 },

    #[error(
        "not enough coins or referrals to reach level {next_level}: \
         {balance}/{coins_price} coins, {referrals}/{referrals_to_open} referrals"
    )]
    InsufficientFunds {
        next_level: i32,
        coins_price: i64,
        balance: i64,
        referrals_to_open: i64,
        referrals: i64,
    },

    #[error("skin {skin_id} is not opened")]
    SkinNotOpened { skin_id: i32 },

    #[error("character level changed concurrently")]
    LevelConflict(#[source] StoreError),

    #[error("store error: {0}")]
    Store(#[source] StoreError),

    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for CharacterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CharacterNotFound { user_id } => {
                CharacterError::CharacterNotFound { user_id }
            }
            conflict @ StoreError::LevelConflict { .. } => CharacterError::LevelConflict(conflict),
            other => CharacterError::Store(other),
        }
    }
}

impl CharacterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CharacterError::CharacterNotFound { .. } | CharacterError::SkinNotFound { .. } => {
                ErrorKind::NotFound
            }
            CharacterError::LevelUnavailable(inner) => inner.kind(),
            CharacterError::NoFurtherLevels { .. }
            | CharacterError::InsufficientFunds { .. }
            | CharacterError::SkinNotOpened { .. } => ErrorKind::Policy,
            CharacterError::LevelConflict(_) => ErrorKind::Conflict,
            CharacterError::Payment(_) => ErrorKind::Payment,
            CharacterError::Store(_) | CharacterError::Internal(_) => ErrorKind::Infrastructure,
        }
    }
}
