use clap::Parser;
use log::{error, info};
use server::catalog::PatternCatalog;
use server::config::ServerConfig;
use server::game::GameEngine;
use server::history::HistoryStore;
use server::http::{router, AdminCredentials, AppState};
use std::sync::Arc;

/// Main-method of the application.
/// Parses the configuration, loads the patterns and history, then runs the
/// round ticker and the HTTP server until one of them stops or Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ServerConfig::parse();

    // Nothing to play without patterns
    let catalog = match PatternCatalog::load(&config.models) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let history = if config.no_persist {
        Arc::new(HistoryStore::in_memory())
    } else {
        Arc::new(HistoryStore::open(&config.history).await)
    };
    match history.path() {
        Some(path) => info!("Recording winners to {}", path.display()),
        None => info!("History kept in memory only"),
    }

    let game = Arc::new(GameEngine::new(
        catalog,
        history,
        config.timer_duration(),
    ));

    let state = AppState::new(
        Arc::clone(&game),
        AdminCredentials::new(config.admin_user.clone(), config.admin_password.clone()),
        config.pages.clone(),
    );

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server listening on {}", address);
    info!(
        "Rounds last {}s, {} patterns loaded",
        config.timer,
        game.catalog().len()
    );

    // Spawn round ticker
    let ticker_handle = tokio::spawn(Arc::clone(&game).run_ticker(config.tick_interval()));

    // Spawn HTTP server
    let server_handle = tokio::spawn(async move { axum::serve(listener, router(state)).await });

    tokio::select! {
        result = server_handle => {
            match result {
                Ok(Err(e)) => error!("HTTP server failed: {}", e),
                Err(e) => error!("HTTP server task panicked: {}", e),
                Ok(Ok(())) => info!("HTTP server stopped"),
            }
        }
        result = ticker_handle => {
            if let Err(e) = result {
                error!("Round ticker task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
