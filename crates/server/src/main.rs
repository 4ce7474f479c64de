use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use leasegate_server::api::{AppState, router};
use leasegate_server::config::LeasegateConfig;

/// Leasegate lock authority HTTP server.
#[derive(Parser, Debug)]
#[command(name = "leasegate-server", about = "Standalone HTTP lock authority for Leasegate")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "leasegate.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port (takes precedence over `PORT`).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut config = LeasegateConfig::load(Path::new(&cli.config))?;
    let env_port = std::env::var("PORT").ok();
    config
        .server
        .apply_overrides(cli.host, cli.port, env_port.as_deref())?;
    config.validate()?;

    let state = AppState::in_memory(&config);
    info!(
        max_cas_attempts = config.locks.max_cas_attempts,
        replay = config.replay.enabled,
        "lock authority initialized with in-memory store"
    );
    let app = router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "leasegate-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM, bounded by the
    // configured drain timeout.
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let serve = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = shutdown_tx.send(true);
            })
            .await
    };

    let timeout_secs = config.server.shutdown_timeout_seconds;
    let drain_deadline = async move {
        if shutdown_rx.wait_for(|stopping| *stopping).await.is_ok() {
            tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = serve => result?,
        () = drain_deadline => {
            warn!(timeout_secs, "shutdown timeout exceeded, dropping open connections");
        }
    }

    info!("leasegate-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
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
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
