//! 测试用的内存实现：存储、缓存与支付网关，均记录调用次数
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use character_service::cache::{CharacterCache, ProgressionCache};
use character_service::clients::PaymentGateway;
use character_service::config::Config;
use character_service::database::CharacterStore;
use character_service::error::{CacheError, PaymentError, StoreError};
use character_service::services::CharacterService;
use character_service::services::character::dto::{
    CharacterProfile, LevelPrice, Skin, SkinStats,
};

pub const USER_ID: i64 = 42;
pub const CACHE_LIFETIME: Duration = Duration::from_secs(60);
pub const LEVEL_PRICES_LIFETIME: Duration = Duration::from_secs(600);

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct CharacterRow {
    pub level: i32,
    pub skin_id: i32,
}

#[derive(Default)]
pub struct FakeStore {
    pub characters: Mutex<HashMap<i64, CharacterRow>>,
    pub skins: Vec<Skin>,
    pub prices: Vec<LevelPrice>,
    pub level_reads: AtomicUsize,
    pub profile_reads: AtomicUsize,
    pub skin_reads: AtomicUsize,
    pub price_reads: AtomicUsize,
    pub increments: AtomicUsize,
    pub skin_changes: AtomicUsize,
    pub fail_increment: AtomicBool,
    pub fail_skins: AtomicBool,
}

impl FakeStore {
    /// 三个等级、三个皮肤，第 N 个皮肤在第 N 级解锁
    pub fn seeded() -> Self {
        Self {
            skins: vec![skin(1, "Rookie", 1), skin(2, "Miner", 2), skin(3, "Tycoon", 3)],
            prices: vec![price(1, 0, 0), price(2, 100, 3), price(3, 500, 5)],
            ..Default::default()
        }
    }

    pub fn with_character(self, user_id: i64, level: i32) -> Self {
        self.characters
            .lock()
            .unwrap()
            .insert(user_id, CharacterRow { level, skin_id: 1 });
        self
    }

    pub fn row(&self, user_id: i64) -> Option<CharacterRow> {
        self.characters.lock().unwrap().get(&user_id).copied()
    }

    pub fn set_level(&self, user_id: i64, level: i32) {
        if let Some(row) = self.characters.lock().unwrap().get_mut(&user_id) {
            row.level = level;
        }
    }

    fn unavailable() -> StoreError {
        StoreError::Database(sqlx::Error::PoolTimedOut)
    }
}

pub fn skin(skin_id: i32, name: &str, unlock_level: i32) -> Skin {
    Skin {
        skin_id,
        name: name.to_string(),
        lore: format!("{} lore", name),
        image_url: format!("/skins/{}.png", skin_id),
        unlock_level,
        price: 0,
        referrals_to_buy: 0,
        referrals_to_open: 0,
        is_opened: false,
        stats: SkinStats::default(),
    }
}

pub fn price(level: i32, coins_price: i64, referrals_to_open: i64) -> LevelPrice {
    LevelPrice {
        level,
        coins_price,
        referrals_price: 1,
        referrals_to_open,
    }
}

#[async_trait]
impl CharacterStore for FakeStore {
    async fn create_character(&self, user_id: i64) -> Result<(), StoreError> {
        self.characters
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert(CharacterRow {
                level: 1,
                skin_id: 1,
            });
        Ok(())
    }

    async fn character_level(&self, user_id: i64) -> Result<i32, StoreError> {
        self.level_reads.fetch_add(1, Ordering::SeqCst);
        self.row(user_id)
            .map(|row| row.level)
            .ok_or(StoreError::CharacterNotFound { user_id })
    }

    async fn character_profile(&self, user_id: i64) -> Result<CharacterProfile, StoreError> {
        self.profile_reads.fetch_add(1, Ordering::SeqCst);
        let row = self
            .row(user_id)
            .ok_or(StoreError::CharacterNotFound { user_id })?;
        let skin = self.skins.iter().find(|s| s.skin_id == row.skin_id);

        Ok(CharacterProfile {
            skin_name: skin.map(|s| s.name.clone()).unwrap_or_default(),
            current_level: row.level,
            mining_rate: i64::from(row.level) * 10,
            mining_duration: 60,
            current_skin_id: row.skin_id,
            skin_image_url: skin.map(|s| s.image_url.clone()).unwrap_or_default(),
        })
    }

    async fn all_skins(&self) -> Result<Vec<Skin>, StoreError> {
        self.skin_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_skins.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.skins.clone())
    }

    async fn all_level_prices(&self) -> Result<Vec<LevelPrice>, StoreError> {
        self.price_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.prices.clone())
    }

    async fn increment_level(&self, user_id: i64, from_level: i32) -> Result<i32, StoreError> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }

        let mut characters = self.characters.lock().unwrap();
        let row = characters
            .get_mut(&user_id)
            .ok_or(StoreError::CharacterNotFound { user_id })?;
        if row.level != from_level {
            return Err(StoreError::LevelConflict {
                user_id,
                expected_level: from_level,
            });
        }

        row.level += 1;
        self.increments.fetch_add(1, Ordering::SeqCst);
        Ok(row.level)
    }

    async fn set_active_skin(&self, user_id: i64, skin_id: i32) -> Result<(), StoreError> {
        let mut characters = self.characters.lock().unwrap();
        let row = characters
            .get_mut(&user_id)
            .ok_or(StoreError::CharacterNotFound { user_id })?;
        row.skin_id = skin_id;
        self.skin_changes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<String, String>>,
    pub ttls: Mutex<HashMap<String, Duration>>,
    pub unavailable: AtomicBool,
}

impl FakeCache {
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.ttls.lock().unwrap().get(key).copied()
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(redis::RedisError::from((redis::ErrorKind::IoError, "connection refused")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressionCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().insert(key.to_string(), value);
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

// ============================================================================
// Payment gateway
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Balance,
    Referrals,
    Initiate {
        user_id: i64,
        amount: i64,
        payment_id: Uuid,
    },
    Finalize {
        payment_id: Uuid,
        success: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitiateBehavior {
    Accept,
    Reject,
    TimeOut,
}

/// 模拟用户服务的冻结/结算：冻结时从余额扣出，确认时丢弃，释放时退回
pub struct FakeGateway {
    pub balance: Mutex<i64>,
    pub referrals: i64,
    pub reserved: Mutex<HashMap<Uuid, i64>>,
    pub calls: Mutex<Vec<GatewayCall>>,
    pub initiate: Mutex<InitiateBehavior>,
    pub fail_balance: AtomicBool,
    pub fail_finalize: AtomicBool,
    pub finalize_delay: Mutex<Duration>,
}

impl FakeGateway {
    pub fn new(balance: i64, referrals: i64) -> Self {
        Self {
            balance: Mutex::new(balance),
            referrals,
            reserved: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            initiate: Mutex::new(InitiateBehavior::Accept),
            fail_balance: AtomicBool::new(false),
            fail_finalize: AtomicBool::new(false),
            finalize_delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn balance(&self) -> i64 {
        *self.balance.lock().unwrap()
    }

    pub fn initiated(&self) -> Vec<Uuid> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Initiate { payment_id, .. } => Some(payment_id),
                _ => None,
            })
            .collect()
    }

    pub fn finalized(&self) -> Vec<(Uuid, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Finalize {
                    payment_id,
                    success,
                } => Some((payment_id, success)),
                _ => None,
            })
            .collect()
    }

    /// 除余额、邀请人数查询之外的调用
    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    GatewayCall::Initiate { .. } | GatewayCall::Finalize { .. }
                )
            })
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn coins_balance(&self, _user_id: i64) -> Result<i64, PaymentError> {
        self.record(GatewayCall::Balance);
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(PaymentError::Rejected {
                operation: "get_coins_balance",
                status: 404,
                message: "user not found".into(),
            });
        }
        Ok(self.balance())
    }

    async fn referrals_count(&self, _user_id: i64) -> Result<i64, PaymentError> {
        self.record(GatewayCall::Referrals);
        Ok(self.referrals)
    }

    async fn initiate_payment(
        &self,
        user_id: i64,
        amount: i64,
        payment_id: Uuid,
    ) -> Result<(), PaymentError> {
        self.record(GatewayCall::Initiate {
            user_id,
            amount,
            payment_id,
        });
        // 让出执行权，使并发升级的请求交错执行
        tokio::task::yield_now().await;

        let behavior = *self.initiate.lock().unwrap();
        match behavior {
            InitiateBehavior::Reject => Err(PaymentError::Rejected {
                operation: "initiate_payment",
                status: 402,
                message: "insufficient balance".into(),
            }),
            InitiateBehavior::TimeOut => {
                // 远端其实已经冻结，只是响应丢了
                *self.balance.lock().unwrap() -= amount;
                self.reserved.lock().unwrap().insert(payment_id, amount);
                Err(PaymentError::Timeout { attempts: 3 })
            }
            InitiateBehavior::Accept => {
                *self.balance.lock().unwrap() -= amount;
                self.reserved.lock().unwrap().insert(payment_id, amount);
                Ok(())
            }
        }
    }

    async fn finalize_payment(&self, payment_id: Uuid, success: bool) -> Result<(), PaymentError> {
        self.record(GatewayCall::Finalize {
            payment_id,
            success,
        });
        let delay = *self.finalize_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_finalize.load(Ordering::SeqCst) {
            return Err(PaymentError::Rejected {
                operation: "finalize_payment",
                status: 500,
                message: "ledger unavailable".into(),
            });
        }

        let reserved = self.reserved.lock().unwrap().remove(&payment_id);
        if let (Some(amount), false) = (reserved, success) {
            *self.balance.lock().unwrap() += amount;
        }
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct Harness {
    pub store: Arc<FakeStore>,
    pub cache: Arc<FakeCache>,
    pub gateway: Arc<FakeGateway>,
    pub service: Arc<CharacterService>,
}

impl Harness {
    pub fn new(store: FakeStore, gateway: FakeGateway) -> Self {
        let store = Arc::new(store);
        let cache = Arc::new(FakeCache::default());
        let gateway = Arc::new(gateway);

        let service = CharacterService::new(
            store.clone(),
            CharacterCache::new(cache.clone(), CACHE_LIFETIME, LEVEL_PRICES_LIFETIME),
            gateway.clone(),
        );

        Self {
            store,
            cache,
            gateway,
            service: Arc::new(service),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        database_max_connections: 1,
        redis_url: String::new(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        user_service_url: "http://127.0.0.1:1".to_string(),
        referral_service_url: "http://127.0.0.1:1".to_string(),
        cache_lifetime_secs: CACHE_LIFETIME.as_secs(),
        level_prices_lifetime_secs: LEVEL_PRICES_LIFETIME.as_secs(),
        client_timeout_secs: 1,
        client_retries: 0,
        request_timeout_secs: 5,
    }
}
