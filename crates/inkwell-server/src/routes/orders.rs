//! `/api/orders`
//!
//! Customers see and create their own orders; everything else is back office.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use inkwell_commerce::prelude::*;
use serde::Deserialize;

use super::{ok, ApiResult, PageParams};
use crate::caller::Caller;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParams {
    pub status: Option<String>,
    /// Admins only; customers always see their own orders.
    pub user: Option<String>,
    pub order_number: Option<i64>,
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<CreateOrderInput>,
) -> ApiResult<OrderView> {
    let user = caller.user(&state.shop)?;
    let orders = state.shop.orders();
    let order = orders.create_order(user.id.as_str(), input)?;
    ok(orders.view(&order)?)
}

async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Query(page): Query<PageParams>,
    Query(params): Query<OrderParams>,
) -> ApiResult<Page<OrderView>> {
    let user = caller.user(&state.shop)?;
    let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(OrderStatus::from_str(raw).ok_or_else(|| {
            ApiError::invalid_query("status", format!("unknown status \"{raw}\""))
        })?),
        None => None,
    };
    let owner = if user.is_admin() {
        params.user.filter(|u| !u.is_empty()).map(UserId::new)
    } else {
        Some(user.id)
    };

    let query = OrderQuery {
        status,
        user: owner,
        order_number: params.order_number,
        page: page.settings(),
    };
    let orders = state.shop.orders();
    let page = orders.list(&query)?;
    let items = page
        .items
        .iter()
        .map(|order| orders.view(order))
        .collect::<Result<Vec<_>, _>>()?;
    ok(Page {
        items,
        total_count: page.total_count,
        page: page.page,
        rows_per_page: page.rows_per_page,
        total_pages: page.total_pages,
    })
}

/// Order detail. Someone else's order reads as not found.
async fn get_one(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<OrderView> {
    let user = caller.user(&state.shop)?;
    let orders = state.shop.orders();
    let order = orders.get(&id)?;
    if !user.is_admin() && order.user != user.id {
        return Err(CommerceError::not_found("Order", id).into());
    }
    ok(orders.view(&order)?)
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

async fn set_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<StatusChange>,
) -> ApiResult<OrderView> {
    caller.admin(&state.shop)?;
    let orders = state.shop.orders();
    let order = orders.transition(&id, body.status)?;
    ok(orders.view(&order)?)
}

async fn cancel(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<OrderView> {
    caller.admin(&state.shop)?;
    let orders = state.shop.orders();
    let order = orders.cancel(&id)?;
    ok(orders.view(&order)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_partly_paid: bool,
}

async fn set_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<Payment>,
) -> ApiResult<OrderView> {
    caller.admin(&state.shop)?;
    let orders = state.shop.orders();
    let order = orders.set_payment(&id, body.is_paid, body.is_partly_paid)?;
    ok(orders.view(&order)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    pub tracking_number: Option<String>,
}

async fn set_tracking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<Tracking>,
) -> ApiResult<OrderView> {
    caller.admin(&state.shop)?;
    let orders = state.shop.orders();
    let order = orders.set_tracking_number(&id, body.tracking_number)?;
    ok(orders.view(&order)?)
}

async fn update_shipping(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(shipping): Json<ShippingDetails>,
) -> ApiResult<OrderView> {
    caller.admin(&state.shop)?;
    let orders = state.shop.orders();
    let order = orders.update_shipping(&id, shipping)?;
    ok(orders.view(&order)?)
}

#[derive(Debug, Deserialize)]
pub struct AdminComment {
    pub comment: Option<String>,
}

async fn set_admin_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<AdminComment>,
) -> ApiResult<OrderView> {
    caller.admin(&state.shop)?;
    let orders = state.shop.orders();
    let order = orders.set_admin_comment(&id, body.comment)?;
    ok(orders.view(&order)?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/{id}", get(get_one))
        .route("/api/orders/{id}/status", post(set_status))
        .route("/api/orders/{id}/cancel", post(cancel))
        .route("/api/orders/{id}/payment", put(set_payment))
        .route("/api/orders/{id}/tracking", put(set_tracking))
        .route("/api/orders/{id}/shipping", put(update_shipping))
        .route("/api/orders/{id}/admin-comment", put(set_admin_comment))
}
