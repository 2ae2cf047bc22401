//! `fleetd`: the control-plane binary. Loads configuration, initializes
//! tracing, runs the startup sequence, serves the HTTP facade, and drains
//! on shutdown.

use std::process::ExitCode;

use fleetd_api::{router, AppState};
use fleetd_daemon::{serve_with_drain, startup, Config, ShutdownHandle};
use tracing_subscriber::EnvFilter;

fn init_tracing(state_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(state_dir, "fleetd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(non_blocking).init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fleetd: failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_tracing(&config.state_dir);

    let started = match startup(config).await {
        Ok(started) => started,
        Err(err) => {
            tracing::error!(%err, "daemon startup failed");
            return ExitCode::FAILURE;
        }
    };

    let drain_timeout = started.config.drain_timeout;
    let lock_path = started.config.lock_path.clone();
    let state = AppState::new(started.controller, started.store, started.proxy.clone());
    let app = router(state);

    let serve_result = serve_with_drain(started.listener, app, drain_timeout).await;

    ShutdownHandle { proxy: started.proxy, lock_path }.shutdown().await;

    match serve_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "http facade exited with error");
            ExitCode::FAILURE
        }
    }
}
