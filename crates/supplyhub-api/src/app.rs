//! Application builder: wires the store, delivery pipeline, worker, and
//! router into a running server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use supplyhub_auth::jwt::JwtDecoder;
use supplyhub_auth::rbac::RbacEnforcer;
use supplyhub_core::config::{AppConfig, StorageBackend};
use supplyhub_core::error::AppError;
use supplyhub_core::result::AppResult;
use supplyhub_core::traits::Clock;
use supplyhub_database::memory::{MemoryDispatchQueue, MemoryNotificationStore};
use supplyhub_database::migration::run_migrations;
use supplyhub_database::repositories::{DispatchTaskRepository, NotificationRepository};
use supplyhub_database::{DatabasePool, DispatchQueue, NotificationStore};
use supplyhub_service::{
    ChannelRegistry, DeliveryOrchestrator, DispatchScheduler, NotificationService,
};
use supplyhub_worker::jobs::{ExpirySweepJob, QueueMaintenanceJob};
use supplyhub_worker::{CronScheduler, DispatchRunner};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds.max(1));
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
}

/// Every long-lived component of the process.
pub struct AppComponents {
    pub config: Arc<AppConfig>,
    pub state: AppState,
    pub store: Arc<dyn NotificationStore>,
    pub queue: Arc<dyn DispatchQueue>,
    pub clock: Arc<dyn Clock>,
    pub orchestrator: Arc<DeliveryOrchestrator>,
    pub runner: Arc<DispatchRunner>,
    pub db_pool: Option<DatabasePool>,
}

impl AppComponents {
    /// Opens the configured backend and wires everything on top of it.
    pub async fn build(config: AppConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        match config.database.backend {
            StorageBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                if config.database.run_migrations {
                    tracing::info!("Running database migrations...");
                    run_migrations(pool.pool()).await?;
                }
                let store = Arc::new(NotificationRepository::new(pool.pool().clone()));
                let queue = Arc::new(DispatchTaskRepository::new(pool.pool().clone()));
                Self::assemble(config, clock, store, queue, Some(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using the in-memory backend; notifications are lost on restart");
                Self::assemble(
                    config,
                    clock,
                    Arc::new(MemoryNotificationStore::new()),
                    Arc::new(MemoryDispatchQueue::new()),
                    None,
                )
            }
        }
    }

    /// Wires services over an already-open store and queue.
    pub fn assemble(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn NotificationStore>,
        queue: Arc<dyn DispatchQueue>,
        db_pool: Option<DatabasePool>,
    ) -> AppResult<Self> {
        let config = Arc::new(config);

        let channels = Arc::new(ChannelRegistry::from_config(&config.delivery)?);
        let scheduler = Arc::new(DispatchScheduler::new(Arc::clone(&queue), Arc::clone(&clock)));
        let orchestrator = Arc::new(DeliveryOrchestrator::new(
            Arc::clone(&store),
            channels,
            Arc::clone(&scheduler),
            Arc::clone(&clock),
            &config.delivery,
        ));
        let notification_service = Arc::new(NotificationService::new(
            Arc::clone(&store),
            Arc::clone(&scheduler),
            Arc::clone(&clock),
            Arc::new(RbacEnforcer::new()),
            config.delivery.max_retries,
        ));
        let runner = Arc::new(DispatchRunner::new(
            Arc::clone(&queue),
            Arc::clone(&orchestrator),
            Arc::clone(&clock),
            scheduler.wake_handle(),
            config.worker.clone(),
            format!("worker-{}", Uuid::new_v4()),
        ));

        let state = AppState {
            config: Arc::clone(&config),
            db_pool: db_pool.clone(),
            dispatch_queue: Arc::clone(&queue),
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            notification_service,
            started_at: Instant::now(),
        };

        Ok(Self {
            config,
            state,
            store,
            queue,
            clock,
            orchestrator,
            runner,
            db_pool,
        })
    }

    /// Cron scheduler with the expiry sweep and queue maintenance jobs
    /// registered but not yet started.
    pub async fn maintenance_scheduler(&self) -> AppResult<CronScheduler> {
        let scheduler = CronScheduler::new().await?;
        scheduler
            .register(
                &self.config.worker.expiry_sweep_cron,
                Arc::new(ExpirySweepJob::new(Arc::clone(&self.store), Arc::clone(&self.clock))),
            )
            .await?;
        scheduler
            .register(
                &self.config.worker.queue_maintenance_cron,
                Arc::new(QueueMaintenanceJob::new(
                    Arc::clone(&self.queue),
                    Arc::clone(&self.store),
                    Arc::clone(&self.clock),
                    &self.config.worker,
                )),
            )
            .await?;
        Ok(scheduler)
    }
}

/// Runs the SupplyHub notification server until a shutdown signal.
pub async fn run_server(config: AppConfig, clock: Arc<dyn Clock>) -> AppResult<()> {
    let components = AppComponents::build(config, clock).await?;
    let config = Arc::clone(&components.config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = if config.worker.enabled {
        let runner = Arc::clone(&components.runner);
        Some(tokio::spawn(runner.run(shutdown_rx)))
    } else {
        tracing::info!("Dispatch worker disabled in this process");
        None
    };

    let mut cron = components.maintenance_scheduler().await?;
    cron.start().await?;

    let app = build_app(components.state.clone());
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(address = %addr, "SupplyHub notification server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("HTTP server stopped, draining background work");
    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Dispatch worker did not stop within the grace period");
        }
    }
    if let Err(e) = cron.shutdown().await {
        tracing::warn!(error = %e, "Cron scheduler did not shut down cleanly");
    }
    if let Some(pool) = &components.db_pool {
        pool.close().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
