//! Reference entity routes: one identical route group per entity.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use inkwell_commerce::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ok, ApiResult, PageParams};
use crate::caller::Caller;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NameParam {
    pub name: Option<String>,
}

async fn list<E>(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(params): Query<NameParam>,
) -> ApiResult<Page<E>>
where
    E: ReferenceEntity + Serialize,
{
    let query = NameQuery {
        name: params.name,
        page: page.settings(),
    };
    ok(state.shop.references::<E>().list(&query)?)
}

async fn get_one<E>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<E>
where
    E: ReferenceEntity + Serialize,
{
    ok(state.shop.references::<E>().get(&id)?)
}

async fn create<E>(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<E::Input>,
) -> ApiResult<E>
where
    E: ReferenceEntity + Serialize,
{
    caller.admin(&state.shop)?;
    ok(state.shop.references::<E>().create(input)?)
}

async fn update<E>(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(input): Json<E::Input>,
) -> ApiResult<E>
where
    E: ReferenceEntity + Serialize,
{
    caller.admin(&state.shop)?;
    ok(state.shop.references::<E>().update(&id, input)?)
}

async fn delete<E>(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<E>
where
    E: ReferenceEntity + Serialize,
{
    caller.admin(&state.shop)?;
    ok(state.shop.references::<E>().delete(&id)?)
}

fn entity_routes<E>(path: &str) -> Router<AppState>
where
    E: ReferenceEntity + Serialize + Send + Sync + 'static,
    E::Input: Send + 'static,
{
    Router::new()
        .route(path, get(list::<E>).post(create::<E>))
        .route(
            &format!("{path}/{{id}}"),
            get(get_one::<E>).put(update::<E>).delete(delete::<E>),
        )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(entity_routes::<Author>("/api/authors"))
        .merge(entity_routes::<BookType>("/api/book-types"))
        .merge(entity_routes::<CoverType>("/api/cover-types"))
        .merge(entity_routes::<Language>("/api/languages"))
        .merge(entity_routes::<PageType>("/api/page-types"))
        .merge(entity_routes::<PublishingHouse>("/api/publishing-houses"))
        .merge(entity_routes::<BookSeries>("/api/book-series"))
        .merge(entity_routes::<Delivery>("/api/deliveries"))
}
