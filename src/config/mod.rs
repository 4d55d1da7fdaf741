use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub user_service_url: String,
    pub referral_service_url: String,
    pub cache_lifetime_secs: u64,
    pub level_prices_lifetime_secs: u64,
    pub client_timeout_secs: u64,
    pub client_retries: u32,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: parse_or("SERVER_PORT", 3000),
            user_service_url: env::var("USER_SERVICE_URL")?,
            referral_service_url: env::var("REFERRAL_SERVICE_URL")?,
            cache_lifetime_secs: parse_secs_or("CACHE_LIFETIME", 3600),
            // 价格表几乎不变，缓存一天
            level_prices_lifetime_secs: parse_secs_or("LEVEL_PRICES_LIFETIME", 86400),
            client_timeout_secs: parse_secs_or("CLIENT_TIMEOUT", 5),
            client_retries: parse_or("CLIENT_RETRIES", 3),
            request_timeout_secs: parse_secs_or("REQUEST_TIMEOUT", 15),
        })
    }

    pub fn cache_lifetime(&self) -> Duration {
        Duration::from_secs(self.cache_lifetime_secs)
    }

    pub fn level_prices_lifetime(&self) -> Duration {
        Duration::from_secs(self.level_prices_lifetime_secs)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// 支持 "30" 与 "30s" 两种写法
fn parse_secs_or(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| parse_secs(&v))
        .unwrap_or(default)
}

fn parse_secs(raw: &str) -> Option<u64> {
    raw.trim().trim_end_matches('s').parse::<u64>().ok()
}
