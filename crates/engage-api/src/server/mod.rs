//! Server setup and initialization
//!
//! Provides the application builder, dependency wiring and the server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};
use engage_cache::{create_shared_pool, RedisCooldownStore, RedisPoolConfig};
use engage_common::{AppConfig, AppError, CooldownBackend};
use engage_core::{CooldownStore, SnowflakeGenerator};
use engage_db::{
    create_pool, migrate, PgCommentRepository, PgReactionRepository, PgTargetRepository,
    PoolSettings,
};
use engage_service::{AggregateReconciler, RecaptchaVerifier, ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config, resolve_actor};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();

    let api = create_router().layer(from_fn_with_state(state.clone(), resolve_actor));
    let api = apply_middleware_with_config(
        api,
        &config.rate_limit,
        &config.cors,
        &config.api.trusted_proxies,
        config.app.env.is_production(),
    )?;
    let health = apply_middleware(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Connect the stores and build the service context
pub async fn create_service_context(config: &AppConfig) -> Result<ServiceContext, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolSettings::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        migrate(&pool)
            .await
            .map_err(|e| AppError::Database(format!("migration failed: {e}")))?;
        info!("Database schema is up to date");
    }

    let mut builder = ServiceContextBuilder::new()
        .reaction_repo(Arc::new(PgReactionRepository::new(pool.clone())))
        .target_repo(Arc::new(PgTargetRepository::new(pool.clone())))
        .comment_repo(Arc::new(PgCommentRepository::new(pool)))
        .cooldown_store(create_cooldown_store(config)?)
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .comment_config(config.comments.clone())
        .risk_config(config.risk.clone());

    if config.risk.enabled {
        let verifier = RecaptchaVerifier::new(&config.risk).map_err(|e| AppError::Config(e.to_string()))?;
        builder = builder.risk_verifier(Arc::new(verifier));
        info!(min_score = config.risk.min_score, "Risk verification enabled");
    } else {
        warn!("Risk verification disabled");
    }

    builder.build().map_err(|e| AppError::Config(e.to_string()))
}

fn create_cooldown_store(config: &AppConfig) -> Result<Arc<dyn CooldownStore>, AppError> {
    match config.comments.cooldown_backend {
        CooldownBackend::Memory => {
            info!("Using in-process cooldown store (single instance only)");
            Ok(Arc::new(engage_cache::MemoryCooldownStore::new()))
        }
        CooldownBackend::Redis => {
            let redis = config
                .redis
                .as_ref()
                .ok_or_else(|| AppError::Config("REDIS_URL is required for the redis cooldown backend".to_string()))?;
            let pool = create_shared_pool(RedisPoolConfig::from(redis))
                .map_err(|e| AppError::Cache(e.to_string()))?;
            info!("Using Redis cooldown store");
            Ok(Arc::new(RedisCooldownStore::new(pool)))
        }
    }
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let service_context = Arc::new(create_service_context(&config).await?);

    if config.reconcile.is_enabled() {
        info!(
            interval_seconds = config.reconcile.interval_seconds,
            batch_size = config.reconcile.batch_size,
            "Starting aggregate reconciler"
        );
        AggregateReconciler::new(Arc::clone(&service_context), &config.reconcile).spawn();
    }

    let state = AppState::new(service_context, config);
    let app = create_app(state)?;

    run_server(app, &addr).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}
