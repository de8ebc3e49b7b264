//! `/api/address`: the caller's checkout address form.
//!
//! Each user has one cascade; a lookup that a newer keystroke superseded
//! answers with `superseded` and leaves the options alone.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use inkwell_carrier::{CascadeState, LookupOutcome, RestoreReport, SavedAddress};
use inkwell_commerce::CommerceError;
use serde::{Deserialize, Serialize};

use super::{ok, ApiResult};
use crate::caller::Caller;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct Selection {
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    #[serde(flatten)]
    pub outcome: LookupOutcome,
    pub state: CascadeState,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub restored: RestoreReport,
    pub state: CascadeState,
}

async fn snapshot(State(state): State<AppState>, caller: Caller) -> ApiResult<CascadeState> {
    let user = caller.user(&state.shop)?;
    ok(state.cascade(&user.id)?.snapshot())
}

async fn settlements(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<SearchParams>,
) -> ApiResult<LookupResponse> {
    let user = caller.user(&state.shop)?;
    let cascade = state.cascade(&user.id)?;
    let outcome = cascade.search_settlements(&params.q).await?;
    ok(LookupResponse {
        outcome,
        state: cascade.snapshot(),
    })
}

async fn select_settlement(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<Selection>,
) -> ApiResult<CascadeState> {
    let user = caller.user(&state.shop)?;
    let cascade = state.cascade(&user.id)?;
    cascade
        .select_settlement(&body.reference)
        .ok_or_else(|| CommerceError::not_found("Settlement", &body.reference))?;
    ok(cascade.snapshot())
}

async fn clear_settlement(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<CascadeState> {
    let user = caller.user(&state.shop)?;
    let cascade = state.cascade(&user.id)?;
    cascade.clear_settlement();
    ok(cascade.snapshot())
}

async fn streets(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<SearchParams>,
) -> ApiResult<LookupResponse> {
    let user = caller.user(&state.shop)?;
    let cascade = state.cascade(&user.id)?;
    let outcome = cascade.search_streets(&params.q).await?;
    ok(LookupResponse {
        outcome,
        state: cascade.snapshot(),
    })
}

async fn select_street(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<Selection>,
) -> ApiResult<CascadeState> {
    let user = caller.user(&state.shop)?;
    let cascade = state.cascade(&user.id)?;
    cascade
        .select_street(&body.reference)
        .ok_or_else(|| CommerceError::not_found("Street", &body.reference))?;
    ok(cascade.snapshot())
}

async fn warehouses(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<SearchParams>,
) -> ApiResult<LookupResponse> {
    let user = caller.user(&state.shop)?;
    let cascade = state.cascade(&user.id)?;
    let outcome = cascade.search_warehouses(&params.q).await?;
    ok(LookupResponse {
        outcome,
        state: cascade.snapshot(),
    })
}

async fn select_warehouse(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<Selection>,
) -> ApiResult<CascadeState> {
    let user = caller.user(&state.shop)?;
    let cascade = state.cascade(&user.id)?;
    cascade
        .select_warehouse(&body.reference)
        .ok_or_else(|| CommerceError::not_found("Warehouse", &body.reference))?;
    ok(cascade.snapshot())
}

/// Re-resolve a saved address, e.g. when editing an existing order.
async fn restore(
    State(state): State<AppState>,
    caller: Caller,
    Json(saved): Json<SavedAddress>,
) -> ApiResult<RestoreResponse> {
    let user = caller.user(&state.shop)?;
    let cascade = state.cascade(&user.id)?;
    let restored = cascade.restore(&saved).await?;
    ok(RestoreResponse {
        restored,
        state: cascade.snapshot(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/address", get(snapshot))
        .route(
            "/api/address/settlements",
            get(settlements).delete(clear_settlement),
        )
        .route("/api/address/settlements/select", post(select_settlement))
        .route("/api/address/streets", get(streets))
        .route("/api/address/streets/select", post(select_street))
        .route("/api/address/warehouses", get(warehouses))
        .route("/api/address/warehouses/select", post(select_warehouse))
        .route("/api/address/restore", post(restore))
}
