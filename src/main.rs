use axum::{routing::{get, post}, Router};
use foundit_match_rust::{api, create_pool, AppConfig, MatchService, PgMatchStore};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database.url, config.database.max_connections).await?;
    info!("Database pool created");

    // 创建匹配服务 (存储能力注入)
    let service = Arc::new(MatchService::new(PgMatchStore::new(pool)));

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/matches/suggest", get(api::suggest_matches))
        .route("/api/matches/owners/:found_id", get(api::potential_owners))
        .route("/api/matches/seed/lost", post(api::seed_lost))
        .route("/api/matches/seed/found", post(api::seed_found))
        .route("/api/matches/export", get(api::export_matches))
        .layer(ServiceBuilder::new())
        .with_state(service);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/matches/suggest?lost_id=   - 刷新并返回候选匹配");
    info!("  GET  /api/matches/owners/:found_id   - 潜在失主 (工作人员)");
    info!("  POST /api/matches/seed/lost          - 挂失侧种子匹配");
    info!("  POST /api/matches/seed/found         - 拾得侧种子匹配");
    info!("  GET  /api/matches/export?lost_id=    - 匹配结果 CSV 导出");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
