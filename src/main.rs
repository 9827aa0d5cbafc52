use anyhow::Context;
use bugtracker::RecordStore;
use bugtracker::api::{self, AppState};
use bugtracker::cli::Cli;
use bugtracker::config;
use bugtracker::logging::{LogFormat, init_logging};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    if let Err(e) = init_logging(cli.verbose, cli.quiet, format) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);
    let config = config::load_config(cli.config.as_deref(), &overrides)
        .context("failed to load configuration")?;

    let store = Arc::new(RecordStore::open(&config.db_path).with_context(|| {
        format!("failed to open database at {}", config.db_path.display())
    })?);

    let app = api::router(AppState::new(Arc::clone(&store)), config.cors.clone());
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, db = %config.db_path.display(), "Server listening");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
        }
        () = shutdown_signal() => {
            info!(grace = ?config.shutdown_grace, "Shutdown requested, draining connections");
            let _ = stop_tx.send(true);
            match tokio::time::timeout(config.shutdown_grace, &mut server).await {
                Ok(result) => result??,
                Err(_) => {
                    warn!("Grace period elapsed, abandoning in-flight requests");
                    server.abort();
                }
            }
        }
    }

    match Arc::try_unwrap(store) {
        Ok(store) => store.close()?,
        Err(store) => {
            // An abandoned request still holds a handle.
            store.flush()?;
        }
    }
    info!("Server stopped");
    Ok(())
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        db: cli.db.clone(),
        bind: cli.bind.clone(),
        cors_origins: cli.cors_origins.clone(),
        shutdown_grace: cli.shutdown_grace,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
