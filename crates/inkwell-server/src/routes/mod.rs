//! Route groups, one per entity.

use axum::Json;
use inkwell_commerce::page::PageSettings;
use inkwell_db::SortOrder;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub mod address;
pub mod basket;
pub mod books;
pub mod group_discounts;
pub mod health;
pub mod orders;
pub mod references;
pub mod users;

/// Success body: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// `page`, `rowsPerPage`, `orderBy` and `order` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<usize>,
    pub rows_per_page: Option<usize>,
    pub order_by: Option<String>,
    pub order: Option<SortOrder>,
}

impl PageParams {
    pub fn settings(self) -> PageSettings {
        let defaults = PageSettings::default();
        PageSettings {
            page: self.page.unwrap_or(defaults.page),
            rows_per_page: self.rows_per_page.unwrap_or(defaults.rows_per_page),
            order_by: self.order_by.filter(|f| !f.is_empty()),
            order: self.order.unwrap_or(defaults.order),
        }
    }
}

/// Split a comma-separated id list, dropping blanks.
pub(crate) fn id_list<T>(raw: Option<&str>, make: impl Fn(&str) -> T) -> Vec<T> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(make)
        .collect()
}
