//! `/api/users`

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use inkwell_commerce::prelude::*;
use serde::Deserialize;

use super::{ok, ApiResult, PageParams};
use crate::caller::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Register a user. Only admins may create other admins.
async fn register(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<UserInput>,
) -> ApiResult<User> {
    if input.role == Role::Admin {
        caller.admin(&state.shop)?;
    }
    ok(state.shop.users().create(input)?)
}

#[derive(Debug, Default, Deserialize)]
pub struct UserParams {
    pub email: Option<String>,
    pub role: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Query(page): Query<PageParams>,
    Query(params): Query<UserParams>,
) -> ApiResult<Page<User>> {
    caller.admin(&state.shop)?;
    let role = match params.role.as_deref().filter(|r| !r.is_empty()) {
        Some("admin") => Some(Role::Admin),
        Some("customer") => Some(Role::Customer),
        Some(other) => {
            return Err(ApiError::invalid_query(
                "role",
                format!("unknown role \"{other}\""),
            ))
        }
        None => None,
    };
    let query = UserQuery {
        email: params.email,
        role,
        page: page.settings(),
    };
    ok(state.shop.users().list(&query)?)
}

async fn me(State(state): State<AppState>, caller: Caller) -> ApiResult<User> {
    ok(caller.user(&state.shop)?)
}

async fn update_me(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<UserInput>,
) -> ApiResult<User> {
    let user = caller.user(&state.shop)?;
    ok(state.shop.users().update_profile(user.id.as_str(), input)?)
}

async fn liked(State(state): State<AppState>, caller: Caller) -> ApiResult<Vec<BookView>> {
    let user = caller.user(&state.shop)?;
    ok(state.shop.users().liked_books(user.id.as_str())?)
}

async fn like(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<String>,
) -> ApiResult<User> {
    let user = caller.user(&state.shop)?;
    ok(state
        .shop
        .users()
        .like_book(user.id.as_str(), &BookId::new(book_id))?)
}

async fn unlike(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<String>,
) -> ApiResult<User> {
    let user = caller.user(&state.shop)?;
    ok(state
        .shop
        .users()
        .unlike_book(user.id.as_str(), &BookId::new(book_id))?)
}

async fn recently_viewed(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Vec<BookView>> {
    let user = caller.user(&state.shop)?;
    ok(state.shop.users().recently_viewed_books(user.id.as_str())?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list).post(register))
        .route("/api/users/me", get(me).put(update_me))
        .route("/api/users/me/liked", get(liked))
        .route("/api/users/me/liked/{book_id}", post(like).delete(unlike))
        .route("/api/users/me/recently-viewed", get(recently_viewed))
}
