use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::timeout::TimeoutLayer;

use crate::{AppState, clients::payment::call_budget, config::Config, middleware::log_errors, routes};

/// 接口前缀
pub const API_BASE_URI: &str = "/api/characters";

/// 一次升级最多串行等待的支付网关调用：查询余额、冻结、确认或释放
const LEVEL_UP_GATEWAY_ROUNDS: u32 = 3;

/// 留给存储与缓存访问的时间
const REQUEST_DEADLINE_SLACK: Duration = Duration::from_secs(2);

/// 入站请求超时。不短于升级在支付网关上可能花费的最长时间，
/// 避免已经扣费提交的升级对调用方报超时
pub fn request_deadline(config: &Config) -> Duration {
    let gateway = call_budget(config.client_timeout(), config.client_retries)
        .saturating_mul(LEVEL_UP_GATEWAY_ROUNDS)
        .saturating_add(REQUEST_DEADLINE_SLACK);
    config.request_timeout().max(gateway)
}

// 角色相关的路由
pub fn character_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(routes::character::create_character))
        .route("/level", get(routes::character::get_character_level))
        .route("/profile", get(routes::character::get_character))
        .route("/skins", get(routes::character::get_all_skins))
        .route("/level-prices", get(routes::character::get_level_prices))
        .route("/level-up", post(routes::character::level_up_character))
        .route("/active-skin", post(routes::character::change_active_skin))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .nest(API_BASE_URI, character_routes())
        .layer(axum::middleware::from_fn(log_errors))
        // 超时后请求被丢弃；付费升级的结算在独立任务里，不受影响
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_deadline(&state.config),
        ));

    // 开发模式允许跨域
    #[cfg(debug_assertions)]
    let router = router.layer(tower_http::cors::CorsLayer::permissive());

    router.with_state(state)
}
