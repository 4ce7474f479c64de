use leasegate_locker::CancellationToken;
use tracing::{info, warn};

/// Returns a token cancelled by the first SIGINT or SIGTERM. A second signal
/// exits the process immediately with status 1.
pub fn cancel_on_signal() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if let Err(e) = next_signal().await {
            warn!(error = %e, "cannot listen for signals");
            return;
        }
        info!("interrupted, stopping (interrupt again to exit now)");
        cancel.cancel();

        if next_signal().await.is_ok() {
            eprintln!("interrupted twice, exiting");
            std::process::exit(1);
        }
    });
    token
}

#[cfg(unix)]
async fn next_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn next_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
