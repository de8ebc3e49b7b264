//! Page settings and paged results.
//!
//! Pages are 0-indexed, matching the `pageSettings` the storefront and the
//! back office send with every list query.

use inkwell_db::{FindOptions, SortOrder};
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;

/// Default rows per page.
pub const DEFAULT_ROWS_PER_PAGE: usize = 25;

/// Upper bound on rows per page.
pub const MAX_ROWS_PER_PAGE: usize = 100;

/// Requested page, size and ordering of a list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    /// Page number (0-indexed).
    #[serde(default)]
    pub page: usize,
    /// Rows per page.
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
    /// Public name of the field to order by.
    #[serde(default)]
    pub order_by: Option<String>,
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
}

fn default_rows_per_page() -> usize {
    DEFAULT_ROWS_PER_PAGE
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            order_by: None,
            order: SortOrder::Asc,
        }
    }
}

impl PageSettings {
    pub fn new(page: usize, rows_per_page: usize) -> Self {
        Self {
            page,
            rows_per_page,
            ..Self::default()
        }
    }

    /// Set ordering.
    pub fn ordered_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some(field.into());
        self.order = order;
        self
    }

    /// Rows per page clamped to `1..=MAX_ROWS_PER_PAGE`.
    pub fn limit(&self) -> usize {
        self.rows_per_page.clamp(1, MAX_ROWS_PER_PAGE)
    }

    /// Offset of the first row of the page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.limit())
    }

    /// Build find options, resolving `order_by` through `sortable`
    /// (public name, document path). Unknown sort fields are rejected.
    pub fn find_options(
        &self,
        sortable: &[(&str, &str)],
        default_sort: &str,
    ) -> Result<FindOptions, CommerceError> {
        let path = match &self.order_by {
            Some(name) => sortable
                .iter()
                .find(|(public, _)| public == name)
                .map(|(_, path)| *path)
                .ok_or_else(|| {
                    CommerceError::InvalidData(format!("cannot order by \"{}\"", name))
                })?,
            None => default_sort,
        };

        Ok(FindOptions::new()
            .sort_by(path, self.order)
            .window(self.offset(), self.limit()))
    }
}

/// A page of results with its position in the full result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The result items.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total_count: usize,
    /// Current page (0-indexed).
    pub page: usize,
    /// Rows per page.
    pub rows_per_page: usize,
    /// Total number of pages (at least 1).
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Create a page.
    pub fn new(items: Vec<T>, total_count: usize, settings: &PageSettings) -> Self {
        let rows_per_page = settings.limit();
        let total_pages = if total_count == 0 {
            1
        } else {
            total_count.div_ceil(rows_per_page)
        };
        Self {
            items,
            total_count,
            page: settings.page,
            rows_per_page,
            total_pages,
        }
    }

    /// Whether there's a next page.
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// Whether there's a previous page.
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Transform the items, keeping the paging info.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            rows_per_page: self.rows_per_page,
            total_pages: self.total_pages,
        }
    }
}
