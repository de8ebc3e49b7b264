//! `/api/group-discounts`

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use inkwell_commerce::group_discount::GroupDiscountView;
use inkwell_commerce::prelude::*;
use serde::Deserialize;

use super::{ok, ApiResult, PageParams};
use crate::caller::Caller;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BookParam {
    pub book: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(params): Query<BookParam>,
) -> ApiResult<Page<GroupDiscountView>> {
    let query = GroupDiscountQuery {
        book: params.book.filter(|b| !b.is_empty()).map(BookId::new),
        page: page.settings(),
    };
    let service = state.shop.group_discounts();
    let page = service.list(&query)?;
    let items = page
        .items
        .iter()
        .cloned()
        .map(|d| service.view(d))
        .collect::<Result<Vec<_>, _>>()?;
    ok(Page {
        items,
        total_count: page.total_count,
        page: page.page,
        rows_per_page: page.rows_per_page,
        total_pages: page.total_pages,
    })
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<GroupDiscountView> {
    let service = state.shop.group_discounts();
    ok(service.view(service.get(&id)?)?)
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<GroupDiscountInput>,
) -> ApiResult<GroupDiscount> {
    caller.admin(&state.shop)?;
    ok(state.shop.group_discounts().create(input)?)
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(input): Json<GroupDiscountInput>,
) -> ApiResult<GroupDiscount> {
    caller.admin(&state.shop)?;
    ok(state.shop.group_discounts().update(&id, input)?)
}

async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<GroupDiscount> {
    caller.admin(&state.shop)?;
    ok(state.shop.group_discounts().delete(&id)?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/group-discounts", get(list).post(create))
        .route(
            "/api/group-discounts/{id}",
            get(get_one).put(update).delete(delete),
        )
}
