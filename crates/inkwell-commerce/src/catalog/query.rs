//! Book list filters.

use inkwell_db::Filter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{
    AuthorId, BookSeriesId, BookTypeId, CoverTypeId, LanguageId, PageTypeId, PublishingHouseId,
};
use crate::money::Money;

/// Public sort names and their document paths.
pub const BOOK_SORTABLE: &[(&str, &str)] = &[
    ("name", "name"),
    ("price", "price.amountCents"),
    ("numberInStock", "numberInStock"),
    ("createdAt", "createdAt"),
];

/// Filters for the book list.
///
/// Empty id lists mean "no restriction"; several ids in one list match any
/// of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookFilters {
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Lowest price, inclusive.
    pub price_min: Option<Money>,
    /// Highest price, inclusive.
    pub price_max: Option<Money>,
    /// Books carrying any of these tags.
    pub tags: Vec<String>,
    pub authors: Vec<AuthorId>,
    pub book_types: Vec<BookTypeId>,
    pub cover_types: Vec<CoverTypeId>,
    pub page_types: Vec<PageTypeId>,
    pub languages: Vec<LanguageId>,
    pub publishing_house: Option<PublishingHouseId>,
    pub book_series: Vec<BookSeriesId>,
    pub in_stock_only: bool,
    pub discounted_only: bool,
}

impl BookFilters {
    /// Build the document filter.
    ///
    /// `house_series` holds the series ids of `publishing_house`, resolved by
    /// the caller since books only reference their series.
    pub fn to_filter(&self, house_series: Option<&[BookSeriesId]>) -> Filter {
        let mut filter = Filter::All;

        if let Some(name) = self.name.as_deref().map(str::trim) {
            if !name.is_empty() {
                filter = filter.and(Filter::text("name", name));
            }
        }

        let min = self.price_min.map(|m| m.amount_cents as f64);
        let max = self.price_max.map(|m| m.amount_cents as f64);
        if min.is_some() || max.is_some() {
            filter = filter.and(Filter::range("price.amountCents", min, max));
        }

        if !self.tags.is_empty() {
            filter = filter.and(Filter::ContainsAny(
                "tags".to_string(),
                self.tags.iter().map(|t| Value::String(t.clone())).collect(),
            ));
        }
        if !self.authors.is_empty() {
            filter = filter.and(Filter::ContainsAny(
                "authors".to_string(),
                self.authors.iter().map(Value::from).collect(),
            ));
        }

        filter = filter
            .and(any_of("bookType", &self.book_types))
            .and(any_of("coverType", &self.cover_types))
            .and(any_of("pageType", &self.page_types))
            .and(any_of("language", &self.languages))
            .and(any_of("bookSeries", &self.book_series));

        if let Some(series) = house_series {
            filter = filter.and(Filter::In(
                "bookSeries".to_string(),
                series.iter().map(Value::from).collect(),
            ));
        }

        if self.in_stock_only {
            filter = filter.and(Filter::range("numberInStock", Some(1.0), None));
        }
        if self.discounted_only {
            filter = filter.and(Filter::Exists("discount".to_string()));
        }

        filter
    }
}

fn any_of<'a, T>(field: &str, ids: &'a [T]) -> Filter
where
    Value: From<&'a T>,
{
    if ids.is_empty() {
        Filter::All
    } else {
        Filter::In(field.to_string(), ids.iter().map(Value::from).collect())
    }
}
