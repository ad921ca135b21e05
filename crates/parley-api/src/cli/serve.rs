//! `parley serve`: run the HTTP API with its background workers.
//!
//! Boot: database and migrations, services, lifecycle manager with the
//! metrics worker, then the listener. Shutdown on Ctrl+C or SIGTERM drains
//! the workers first, then lets in-flight HTTP requests finish within the
//! configured bound.

use anyhow::Result;
use parley_core::lifecycle::manager::{DrainOutcome, LifecycleManager};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::http::router::build_router;
use crate::settings::Settings;
use crate::state::AppState;

pub async fn serve(settings: Settings) -> Result<()> {
    let (state, metrics_worker) = AppState::init(&settings).await?;

    let mut lifecycle = LifecycleManager::new();
    lifecycle.register(metrics_worker)?;
    lifecycle.start()?;

    let drain_timeout = settings.config.workers.drain_timeout();
    let addr = settings.bind_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            lifecycle.stop(drain_timeout).await?;
            return Err(e.into());
        }
    };

    info!(
        %addr,
        data_dir = %state.data_dir.display(),
        metrics_interval_secs = settings.metrics_interval.as_secs(),
        "parley listening"
    );

    let router = build_router(state.clone(), &settings.config.server);
    let (stop_http, http_stopped) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = http_stopped.await;
            })
            .into_future(),
    );

    tokio::select! {
        joined = &mut server => {
            // The server only returns early on an accept-loop failure
            error!("HTTP server exited unexpectedly");
            lifecycle.stop(drain_timeout).await?;
            joined??;
            return Ok(());
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    let report = lifecycle.stop(drain_timeout).await?;
    if let DrainOutcome::TimedOut { still_running } = report.outcome {
        warn!(still_running, "continuing shutdown with unfinished background tasks");
    }

    let _ = stop_http.send(());
    match tokio::time::timeout(settings.config.server.shutdown_timeout(), &mut server).await {
        Ok(joined) => joined??,
        Err(_) => {
            warn!(
                timeout_secs = settings.config.server.shutdown_timeout_secs,
                "HTTP shutdown timed out, aborting open connections"
            );
            server.abort();
        }
    }

    state.db_pool.close().await;
    info!("server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
