use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_api::api::router;
use course_api::config::AppConfig;
use course_api::db::{self, SqliteCourseRepository};
use course_api::services::CourseService;
use course_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_api=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url, config.db_max_connections).await?;
    db::migrate(&pool).await?;

    let repo = SqliteCourseRepository::new(
        pool.clone(),
        Duration::from_secs(config.db_query_timeout_secs),
    );
    let state = AppState {
        service: CourseService::new(Arc::new(repo)),
        config: Arc::new(config.clone()),
    };

    let app = router(state);

    let addr = config.address();
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
