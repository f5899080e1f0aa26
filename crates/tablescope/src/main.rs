//! Tablescope - a read-only HTTP service that profiles PostgreSQL tables.

mod api;
mod app;

use std::net::SocketAddr;
use std::process::ExitCode;

use app::Context;
use tablescope_core::logging::{init_logging, LogConfig};
use tablescope_core::{ConnectionPool, ServiceConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tablescope: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _logging_guard = init_logging(LogConfig::new(config.log_dir.clone()));
    tracing::info!(?config, "Starting Tablescope");

    let pool = match ConnectionPool::new(&config) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create connection pool");
            return ExitCode::FAILURE;
        }
    };

    // An unreachable database is not fatal; requests report it until it is back.
    if let Err(e) = pool.verify().await {
        tracing::warn!(error = %e, "Database is not reachable at startup");
    }

    let addr = SocketAddr::new(config.host, config.port);
    let context = Context::new(pool.clone(), config.max_preview_rows);
    let result = app::serve(addr, context, shutdown_signal()).await;
    pool.close();

    match result {
        Ok(()) => {
            tracing::info!("Tablescope stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, %addr, "Server error");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
