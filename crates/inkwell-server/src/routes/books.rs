//! `/api/books`

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use inkwell_commerce::prelude::*;
use serde::Deserialize;

use super::{id_list, ok, ApiResult, PageParams};
use crate::caller::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Catalog filters as query parameters. Lists are comma-separated ids,
/// prices are decimal amounts in the shop currency.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFilterParams {
    pub name: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub tags: Option<String>,
    pub authors: Option<String>,
    pub book_types: Option<String>,
    pub cover_types: Option<String>,
    pub page_types: Option<String>,
    pub languages: Option<String>,
    pub publishing_house: Option<String>,
    pub book_series: Option<String>,
    #[serde(default)]
    pub in_stock_only: bool,
    #[serde(default)]
    pub discounted_only: bool,
}

impl BookFilterParams {
    pub fn into_filters(self, currency: Currency) -> Result<BookFilters, ApiError> {
        let price = |name: &'static str, value: Option<f64>| match value {
            Some(v) if !v.is_finite() || v < 0.0 => {
                Err(ApiError::invalid_query(name, "must be a non-negative amount"))
            }
            Some(v) => Ok(Some(Money::from_decimal(v, currency))),
            None => Ok(None),
        };

        Ok(BookFilters {
            name: self.name.filter(|n| !n.trim().is_empty()),
            price_min: price("priceMin", self.price_min)?,
            price_max: price("priceMax", self.price_max)?,
            tags: id_list(self.tags.as_deref(), str::to_string),
            authors: id_list(self.authors.as_deref(), |s| AuthorId::new(s)),
            book_types: id_list(self.book_types.as_deref(), |s| BookTypeId::new(s)),
            cover_types: id_list(self.cover_types.as_deref(), |s| CoverTypeId::new(s)),
            page_types: id_list(self.page_types.as_deref(), |s| PageTypeId::new(s)),
            languages: id_list(self.languages.as_deref(), |s| LanguageId::new(s)),
            publishing_house: self
                .publishing_house
                .filter(|h| !h.is_empty())
                .map(PublishingHouseId::new),
            book_series: id_list(self.book_series.as_deref(), |s| BookSeriesId::new(s)),
            in_stock_only: self.in_stock_only,
            discounted_only: self.discounted_only,
        })
    }
}

async fn list_books(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filters): Query<BookFilterParams>,
) -> ApiResult<Page<BookView>> {
    let filters = filters.into_filters(state.shop.settings().currency)?;
    ok(state.shop.catalog().list_books(&page.settings(), &filters)?)
}

/// Book detail. A signed-in caller gets the book recorded as recently viewed.
async fn get_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<BookView> {
    let view = state.shop.catalog().view(&id)?;
    if let Some(user) = caller.optional_user(&state.shop) {
        state.shop.users().record_view(user.id.as_str(), &view.id)?;
    }
    ok(view)
}

async fn create_book(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<BookInput>,
) -> ApiResult<Book> {
    caller.admin(&state.shop)?;
    ok(state.shop.catalog().create(input)?)
}

async fn update_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(input): Json<BookInput>,
) -> ApiResult<Book> {
    caller.admin(&state.shop)?;
    ok(state.shop.catalog().update(&id, input)?)
}

async fn delete_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Book> {
    caller.admin(&state.shop)?;
    ok(state.shop.catalog().delete(&id)?)
}

#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
}

async fn adjust_stock(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<StockAdjustment>,
) -> ApiResult<Book> {
    caller.admin(&state.shop)?;
    ok(state.shop.catalog().adjust_stock(&id, body.delta)?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/books", get(list_books).post(create_book))
        .route(
            "/api/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/books/{id}/stock", post(adjust_stock))
}
