use clap::Parser;
use crackhash_worker::server::{
    client::manager::ManagerClient,
    config::{CliArgs, ServerConfig},
    http::routes::router,
    service::handler::TaskExecutionService,
    telemetry::{TelemetryProviders, init_telemetry},
};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    let manager = ManagerClient::new(&config.manager_address, config.request_timeout)?;
    let worker_id = match manager.register(config.port).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to register worker: {e:#}");
            providers.shutdown();
            return Err(e);
        }
    };
    tracing::info!(%worker_id, "Worker registered");

    let service =
        TaskExecutionService::start(config.num_workers, config.part_timeout, worker_id, manager)?;

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    axum::serve(listener, router(service.clone()))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    stop(service, &config, providers).await;
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting worker with full config: {config:#?}");
    } else {
        tracing::info!(
            "Starting worker on {}:{} with {} workers",
            config.host,
            config.port,
            config.num_workers
        );
    }
}

async fn shutdown_signal(token: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
    token.cancel();
}

async fn stop(service: TaskExecutionService, config: &ServerConfig, providers: TelemetryProviders) {
    tracing::info!(
        "Stopping task execution (timeout {:?})",
        config.shutdown_timeout
    );

    match tokio::time::timeout(config.shutdown_timeout, service.shutdown()).await {
        Ok(Ok(())) => tracing::info!("Service shut down successfully"),
        Ok(Err(e)) => tracing::error!("Error during service shutdown: {e}"),
        Err(_) => tracing::warn!("Graceful shutdown timed out, abandoning in-flight parts"),
    }

    providers.shutdown();
}
