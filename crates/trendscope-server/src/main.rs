mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use trendscope_analyzer::LlmClient;
use trendscope_collect::{default_collectors, Fetcher};
use trendscope_pipeline::PipelineDeps;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(trendscope_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendscope_db::PoolConfig::from_app_config(&config);
    let pool = trendscope_db::connect_pool(&config.database_url, pool_config).await?;
    trendscope_db::run_migrations(&pool).await?;

    let fetcher = Fetcher::from_app_config(&config)?;
    let feeds = trendscope_core::load_feeds(&config.feeds_path)?;
    let llm = LlmClient::from_app_config(&config)?;
    let deps = Arc::new(PipelineDeps {
        pool: pool.clone(),
        fetcher,
        feeds,
        collectors: default_collectors(),
        model: llm.default_model().to_string(),
        llm,
    });

    let _scheduler = scheduler::build_scheduler(Arc::clone(&deps), Arc::clone(&config)).await?;

    let app = build_app(AppState { pool, deps });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
