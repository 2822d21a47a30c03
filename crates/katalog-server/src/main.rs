mod api;
mod cache;
mod middleware;
mod scheduler;

use std::sync::Arc;

use katalog_fastprint::FastprintClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    cache::StatusCache,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(katalog_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = katalog_db::PoolConfig::from_app_config(&config);
    let pool = katalog_db::connect_pool(&config.database_url, pool_config).await?;
    katalog_db::run_migrations(&pool).await?;

    let client = FastprintClient::from_config(&config)?;
    let status_cache = StatusCache::from_config(&config);

    let _scheduler = scheduler::build_scheduler(
        pool.clone(),
        client.clone(),
        status_cache.clone(),
        &config,
    )
    .await?;

    let app = build_app(AppState {
        pool,
        client,
        status_cache,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "katalog-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
