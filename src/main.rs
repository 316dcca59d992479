use std::sync::Arc;

use tracing::{error, info, warn};

use pantry::metrics::Metrics;
use pantry::store::{seed, SqliteStore};
use pantry::{logging, App, Config, Server};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&config.logging);
    info!("Starting pantry {}", pantry::VERSION);
    config.log_summary();

    // Single-threaded runtime: the work is I/O bound
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let store = Arc::new(
        SqliteStore::connect(&config.database.url, config.database.max_connections).await?,
    );
    if config.database.seed {
        seed(&store).await?;
    }

    let metrics = Arc::new(Metrics::new()?);
    let app = App::new(Arc::clone(&store), config.session.clone(), Arc::clone(&metrics));
    let server = Arc::new(Server::bind(config.server, app, metrics).await?);

    let accept = {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Server error: {}", e);
            }
        })
    };

    shutdown_signal().await;
    info!("Shutting down...");

    server.trigger_shutdown();
    let _ = accept.await;
    if !server.wait_for_drain(server.drain_timeout()).await {
        warn!("Closing with connections still open");
    }

    store.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
