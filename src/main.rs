use co_optimal::db::postgres::UserStorage;
use co_optimal::router::{AppState, app_router};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &co_optimal::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        project = %cfg.api.project_name,
        database = %cfg.postgres.redacted_url(),
        loglevel = %cfg.loglevel,
        "starting backend"
    );

    if cfg.api.admin_key.is_empty() {
        warn!("API_ADMIN_KEY is empty; all mutating routes will be rejected");
    }

    info!("creating connection pool");
    let storage = UserStorage::connect_lazy(&cfg.postgres, &cfg.pool)?;
    storage.run_migrations().await?;

    info!("checking connection pool");
    match storage.health_check().await {
        Ok(()) => info!("connection pool is working"),
        Err(e) => warn!(error = %e, "connection pool health check failed"),
    }

    let state = AppState::new(storage.clone(), cfg.api.admin_key.clone());
    let app = app_router(state, &cfg.api.version_prefix, &cfg.api.cors_origins);

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close().await;
    info!("connection pool closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    info!("shutdown signal received");
}
