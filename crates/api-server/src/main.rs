//! API Server for the todo app
//!
//! Serves the task list REST API over the session stored in the data directory.

mod config;
mod routes;
mod state;

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=debug,todo_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Using data directory: {:?}", config.data_dir);

    let app_state = AppState::new(&config).await;
    if app_state.session().read().await.recovered_from_corrupt() {
        tracing::warn!("Stored todos could not be read; the next change will overwrite them");
    }

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::task::router())
        .merge(routes::transfer::router(config.max_import_bytes))
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("REST API listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
