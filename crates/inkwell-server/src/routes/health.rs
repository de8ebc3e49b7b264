//! `/health`

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use inkwell_commerce::shop::ShopStats;
use serde::Serialize;

use super::{ok, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub stats: ShopStats,
}

async fn health(State(state): State<AppState>) -> ApiResult<Health> {
    ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        stats: state.shop.stats()?,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
