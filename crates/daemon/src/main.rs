//! Payables Daemon - Main Entry Point
//! JSON-RPC server + batch ingestion worker over one SQLite database

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{DaemonConfig, LogFormat};
use payables_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use payables_core::application::{
    shutdown_channel, AssignorService, BatchCreateHandler, IngestionPipeline, PayableService,
    RecoveryService, RetryPolicy, ShutdownToken, Worker,
};
use payables_core::domain::PAYABLE_QUEUE;
use payables_core::port::id_provider::UuidProvider;
use payables_core::port::time_provider::SystemTimeProvider;
use payables_core::port::JobHandler;
use payables_infra_sqlite::{
    create_pool, run_migrations, SqliteAssignorRepository, SqliteJobQueue, SqlitePayableStore,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WORKER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration (before logging: it decides the log format)
    let config = DaemonConfig::from_env().context("Failed to load configuration")?;

    // 2. Logging
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("payables=info"))
        .context("Failed to create env filter")?;
    let registry = tracing_subscriber::registry()
        .with(telemetry::layer().context("Failed to initialize OpenTelemetry")?)
        .with(env_filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(writer))
            .init(),
    }

    info!("Payables daemon v{} starting...", VERSION);

    // 3. Database
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !config.db_path.starts_with("sqlite:") && !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    info!(db_path = %config.db_path, "Initializing database...");
    let pool = create_pool(&config.database_url())
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Dependencies
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let store = Arc::new(SqlitePayableStore::new(pool.clone()));
    let assignors = Arc::new(SqliteAssignorRepository::new(pool.clone()));
    let job_queue = Arc::new(SqliteJobQueue::new(
        pool.clone(),
        id_provider.clone(),
        time_provider.clone(),
    ));

    // 5. Crash recovery: no worker is running yet, so every RUNNING job is orphaned
    info!("Running crash recovery...");
    let recovery_service = Arc::new(RecoveryService::new(
        job_queue.clone(),
        time_provider.clone(),
        None,
    ));
    match recovery_service.requeue_interrupted_jobs().await {
        Ok(count) => info!(recovered_jobs = count, "Crash recovery completed"),
        Err(e) => error!(error = %e, "Crash recovery failed"),
    }

    // 6. JSON-RPC server
    let handler = RpcHandler::new(
        Arc::new(IngestionPipeline::new(assignors.clone(), job_queue.clone())),
        Arc::new(PayableService::new(
            store.clone(),
            assignors.clone(),
            id_provider.clone(),
            time_provider.clone(),
            config.actor.clone(),
        )),
        Arc::new(AssignorService::new(
            assignors,
            id_provider.clone(),
            time_provider.clone(),
        )),
        job_queue.clone(),
    );
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (rpc_addr, rpc_handle) = RpcServer::new(rpc_config, handler)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 7. Batch worker
    info!("Starting worker...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let handlers: Vec<Arc<dyn JobHandler>> = vec![Arc::new(BatchCreateHandler::new(
        store,
        id_provider,
        time_provider.clone(),
        config.worker_actor.clone(),
    ))];
    let worker = Worker::new(
        PAYABLE_QUEUE,
        job_queue,
        handlers,
        Arc::new(RetryPolicy::new(
            time_provider.clone(),
            config.retry_base_delay_ms,
        )),
        time_provider,
    );
    let worker_shutdown = shutdown_rx.clone();
    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker.run(worker_shutdown).await {
            error!(error = %e, "Worker failed");
        }
    });

    // Jobs stuck RUNNING past the recovery window (hung handler) go back to the queue
    let sweep_handle = tokio::spawn(recovery_sweep(recovery_service, shutdown_rx));

    info!(addr = %rpc_addr, "System ready. Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown: stop intake first, then let the worker finish its job
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    shutdown_tx.shutdown();
    if tokio::time::timeout(WORKER_STOP_TIMEOUT, worker_handle)
        .await
        .is_err()
    {
        error!("Worker did not stop in time; its job will be recovered on next start");
    }
    let _ = sweep_handle.await;
    pool.close().await;
    telemetry::shutdown();

    info!("Shutdown complete.");
    Ok(())
}

/// Periodic orphan sweep until shutdown
async fn recovery_sweep(recovery: Arc<RecoveryService>, mut shutdown: ShutdownToken) {
    let mut ticker = tokio::time::interval(recovery.sweep_interval());
    // First tick fires immediately; startup recovery already ran
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = ticker.tick() => {
                if let Err(e) = recovery.requeue_orphaned_jobs().await {
                    error!(error = %e, "Orphan sweep failed");
                }
            }
        }
    }
}
