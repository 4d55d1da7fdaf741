use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use character_service::{
    AppState,
    cache::{CharacterCache, RedisCache},
    clients::HttpPaymentGateway,
    config::Config,
    database::{CharacterRepository, MIGRATOR},
    router::{create_router, request_deadline},
    services::CharacterService,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    let deadline = request_deadline(&config);
    if deadline > config.request_timeout() {
        tracing::warn!(
            "REQUEST_TIMEOUT raised to {:?} to cover payment gateway retries",
            deadline
        );
    }

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'character_service';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // 设置 Redis 客户端
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");

    // 设置支付网关客户端
    let payments = HttpPaymentGateway::new(&config).expect("Failed to build payment gateway client");

    let cache = CharacterCache::new(
        Arc::new(RedisCache::new(Arc::new(redis_client))),
        config.cache_lifetime(),
        config.level_prices_lifetime(),
    );
    let characters = CharacterService::new(
        Arc::new(CharacterRepository::new(pool)),
        cache,
        Arc::new(payments),
    );

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        characters: Arc::new(characters),
    };

    let app = create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    tracing::info!("Server stopped gracefully");
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Received shutdown signal, initiating graceful shutdown");
}
