//! # Recipes Server
//!
//! HTTP service for recipe records and their ratings, stored in Redis.
//!
//!
//!
//! # Request Flow
//! - axum parses the path and body, a malformed JSON body is a plain 400
//! - Mutating recipe routes pass through [`auth::require_auth`] first
//! - [`service`] validates the input, nothing touches Redis while violations remain
//! - [`proxy`] turns the use case into key-value calls, [`codec`] shapes the fields
//! - Failures travel back as [`error::AppError`] and become a status by method
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Auth | Success |
//! |---|---|---|---|
//! | GET | `/recipes` | no | 200 + JSON array |
//! | GET | `/recipes/{id}` | no | 200 + JSON recipe |
//! | POST | `/recipes` | yes | 201 + JSON recipe |
//! | PUT | `/recipes/{id}` | yes | 200 + JSON recipe |
//! | DELETE | `/recipes/{id}` | yes | 204 |
//! | POST | `/recipes/{id}/rate` | no | 200 |
//! | POST | `/recipes/{id}/rating` | no | 200, older name of `/rate` |
//! | GET | `/health` | no | 200 |
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! REDIS_URL=redis://127.0.0.1:6379 RUST_LOG=info cargo run -p recipes
//! ```
//!
//! Run without Redis, records live in memory until shutdown.
//! ```sh
//! STORE_BACKEND=memory cargo run -p recipes
//! ```
//!
//! Provision a credential.
//! ```sh
//! cargo run -p tokens -- --redis-url redis://127.0.0.1:6379 chef:secret
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{dispatcher, error, info};

pub mod auth;
pub mod codec;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod proxy;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod utils;
pub mod validation;

use auth::require_auth;
use config::Config;
use logging::Logger;
use routes::{
    create_recipe_handler, delete_recipe_handler, get_recipe_handler, health_handler,
    list_recipes_handler, rate_handler, update_recipe_handler,
};
use state::AppState;

pub async fn start_server() -> anyhow::Result<()> {
    let logger = Logger::from_env();
    dispatcher::set_global_default(logger.dispatch().clone())
        .context("Failed to install tracing subscriber")?;

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config, logger)
        .await
        .context("Failed to reach the store")?;

    info!("Starting server...");

    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let protected = Router::new()
        .route("/recipes", post(create_recipe_handler))
        .route(
            "/recipes/{id}",
            put(update_recipe_handler).delete(delete_recipe_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/recipes", get(list_recipes_handler))
        .route("/recipes/{id}", get(get_recipe_handler))
        .route("/recipes/{id}/rate", post(rate_handler))
        .route("/recipes/{id}/rating", post(rate_handler))
        .route("/health", get(health_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            return std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await
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
