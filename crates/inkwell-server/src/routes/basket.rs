//! `/api/basket`: the caller's basket.
//!
//! Every change answers with the re-priced basket.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use inkwell_commerce::basket::ReconciledBasket;
use inkwell_commerce::prelude::*;
use serde::Deserialize;

use super::{ok, ApiResult};
use crate::caller::Caller;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBook {
    pub book_id: BookId,
    #[serde(default = "one")]
    pub count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGroupDiscount {
    pub group_discount_id: GroupDiscountId,
    #[serde(default = "one")]
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetCount {
    pub count: i64,
}

fn one() -> i64 {
    1
}

fn quote(state: &AppState, user: &User) -> ApiResult<BasketQuote> {
    ok(state.shop.baskets().price(user.id.as_str())?)
}

async fn get_basket(State(state): State<AppState>, caller: Caller) -> ApiResult<BasketQuote> {
    let user = caller.user(&state.shop)?;
    quote(&state, &user)
}

async fn clear(State(state): State<AppState>, caller: Caller) -> ApiResult<BasketQuote> {
    let user = caller.user(&state.shop)?;
    state.shop.baskets().clear(user.id.as_str())?;
    quote(&state, &user)
}

async fn add_book(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<AddBook>,
) -> ApiResult<BasketQuote> {
    let user = caller.user(&state.shop)?;
    state
        .shop
        .baskets()
        .add_book(user.id.as_str(), &body.book_id, body.count)?;
    quote(&state, &user)
}

async fn set_book_count(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<String>,
    Json(body): Json<SetCount>,
) -> ApiResult<BasketQuote> {
    let user = caller.user(&state.shop)?;
    state
        .shop
        .baskets()
        .set_book_count(user.id.as_str(), &BookId::new(book_id), body.count)?;
    quote(&state, &user)
}

async fn remove_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<String>,
) -> ApiResult<BasketQuote> {
    let user = caller.user(&state.shop)?;
    state
        .shop
        .baskets()
        .remove_book(user.id.as_str(), &BookId::new(book_id))?;
    quote(&state, &user)
}

async fn add_group_discount(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<AddGroupDiscount>,
) -> ApiResult<BasketQuote> {
    let user = caller.user(&state.shop)?;
    state.shop.baskets().add_group_discount(
        user.id.as_str(),
        &body.group_discount_id,
        body.count,
    )?;
    quote(&state, &user)
}

async fn set_group_discount_count(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<SetCount>,
) -> ApiResult<BasketQuote> {
    let user = caller.user(&state.shop)?;
    state.shop.baskets().set_group_discount_count(
        user.id.as_str(),
        &GroupDiscountId::new(id),
        body.count,
    )?;
    quote(&state, &user)
}

async fn remove_group_discount(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<BasketQuote> {
    let user = caller.user(&state.shop)?;
    state
        .shop
        .baskets()
        .remove_group_discount(user.id.as_str(), &GroupDiscountId::new(id))?;
    quote(&state, &user)
}

/// Merge the basket a visitor built before signing in.
async fn merge(
    State(state): State<AppState>,
    caller: Caller,
    Json(incoming): Json<Basket>,
) -> ApiResult<ReconciledBasket> {
    let user = caller.user(&state.shop)?;
    ok(state.shop.baskets().merge(user.id.as_str(), &incoming)?)
}

async fn reconcile(State(state): State<AppState>, caller: Caller) -> ApiResult<ReconciledBasket> {
    let user = caller.user(&state.shop)?;
    ok(state.shop.baskets().reconcile(user.id.as_str())?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/basket", get(get_basket).delete(clear))
        .route("/api/basket/books", post(add_book))
        .route(
            "/api/basket/books/{book_id}",
            put(set_book_count).delete(remove_book),
        )
        .route("/api/basket/group-discounts", post(add_group_discount))
        .route(
            "/api/basket/group-discounts/{id}",
            put(set_group_discount_count).delete(remove_group_discount),
        )
        .route("/api/basket/merge", post(merge))
        .route("/api/basket/reconcile", post(reconcile))
}
