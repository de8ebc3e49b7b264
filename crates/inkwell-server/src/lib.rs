//! HTTP JSON API for the Inkwell bookstore.
//!
//! One route group per entity under `/api`, plus `/health`. The caller is
//! identified by the `x-user-id` header; errors render as
//! `{ "success": false, "code", "message" }`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use inkwell_commerce::prelude::*;
//! use inkwell_server::{serve, AppState, ServerConfig};
//!
//! let shop = Arc::new(Shop::in_memory(ShopSettings::default()));
//! let shutdown = async { tokio::signal::ctrl_c().await.ok(); };
//! serve(AppState::new(shop), &ServerConfig::default(), shutdown).await?;
//! ```

mod access;
mod caller;
mod config;
mod error;
pub mod routes;
mod state;

use std::future::Future;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use caller::{Caller, USER_ID_HEADER};
pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody};
pub use state::AppState;

/// Build the API router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::books::router())
        .merge(routes::references::router())
        .merge(routes::group_discounts::router())
        .merge(routes::users::router())
        .merge(routes::basket::router())
        .merge(routes::orders::router())
        .merge(routes::address::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access::access_log,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = config
        .addr()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "inkwell api listening");

    axum::serve(listener, router(state, config))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests;
