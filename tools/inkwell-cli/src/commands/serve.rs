//! Run the HTTP API.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use inkwell_carrier::NovaPoshtaClient;
use inkwell_commerce::Shop;
use inkwell_observability::init_tracing;
use inkwell_server::{serve, AppState};
use tracing::{info, warn};

use super::ServeArgs;
use crate::context::Context;

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    init_tracing(&ctx.config.logging);

    let mut server = ctx.config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let shop = if args.ephemeral {
        Arc::new(Shop::in_memory(ctx.config.shop.clone()))
    } else {
        Arc::new(ctx.open_shop()?)
    };

    let mut state = AppState::new(shop.clone()).with_logging(ctx.config.logging.clone());
    if ctx.config.carrier.api_key.is_some() {
        let client = NovaPoshtaClient::new(&ctx.config.carrier)
            .context("Failed to build carrier client")?;
        state = state.with_carrier(Arc::new(client), ctx.config.carrier.clone());
    } else {
        warn!("carrier.api_key not set, address lookups disabled");
    }

    ctx.output.info(&format!(
        "Listening on http://{}:{}",
        server.host, server.port
    ));

    serve(state, &server, shutdown_signal())
        .await
        .context("Server failed")?;

    if !args.ephemeral {
        shop.persist().context("Failed to save database")?;
        info!(path = %ctx.database_path().display(), "database saved");
        ctx.output.success("Database saved");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
