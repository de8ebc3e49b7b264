//! Book documents.

use inkwell_db::Document;
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{
    AuthorId, BookId, BookSeriesId, BookTypeId, CoverTypeId, ImageId, LanguageId, PageTypeId,
};
use crate::money::Money;

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub price: Money,
    pub number_in_stock: i64,
    /// Discount percent. Stored as `None` when zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default)]
    pub image_ids: Vec<ImageId>,
    pub book_series: BookSeriesId,
    pub book_type: BookTypeId,
    pub page_type: PageTypeId,
    pub cover_type: CoverTypeId,
    pub language: LanguageId,
    #[serde(default)]
    pub authors: Vec<AuthorId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishing_year: Option<i32>,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}

impl Document for Book {
    const COLLECTION: &'static str = "books";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Book {
    /// Create a book from input with a fresh id.
    pub fn from_input(input: BookInput) -> Self {
        let mut book = Self {
            id: BookId::generate(),
            name: String::new(),
            price: input.price,
            number_in_stock: 0,
            discount: None,
            image_ids: Vec::new(),
            book_series: input.book_series.clone(),
            book_type: input.book_type.clone(),
            page_type: input.page_type.clone(),
            cover_type: input.cover_type.clone(),
            language: input.language.clone(),
            authors: Vec::new(),
            tags: Vec::new(),
            description: None,
            isbn: None,
            number_of_pages: None,
            publishing_year: None,
            created_at: crate::current_timestamp(),
        };
        book.apply(input);
        book
    }

    /// Overwrite the editable fields, keeping id and creation time.
    pub fn apply(&mut self, input: BookInput) {
        self.name = input.name.trim().to_string();
        self.price = input.price;
        self.number_in_stock = input.number_in_stock;
        self.discount = input.discount.filter(|d| *d != 0.0);
        self.image_ids = input.image_ids;
        self.book_series = input.book_series;
        self.book_type = input.book_type;
        self.page_type = input.page_type;
        self.cover_type = input.cover_type;
        self.language = input.language;
        self.authors = dedup(input.authors);
        self.tags = dedup(input.tags);
        self.description = input.description;
        self.isbn = input.isbn;
        self.number_of_pages = input.number_of_pages;
        self.publishing_year = input.publishing_year;
    }

    /// Check numeric fields and the name.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.is_empty() {
            return Err(CommerceError::InvalidData("book name must not be empty".into()));
        }
        if self.price.is_negative() {
            return Err(CommerceError::BadData("price must not be negative".into()));
        }
        if self.number_in_stock < 0 {
            return Err(CommerceError::BadData(
                "number in stock must not be negative".into(),
            ));
        }
        if let Some(discount) = self.discount {
            if !(0.0..=100.0).contains(&discount) {
                return Err(CommerceError::BadData(format!(
                    "discount {} is outside 0..100",
                    discount
                )));
            }
        }
        Ok(())
    }

    pub fn in_stock(&self) -> bool {
        self.number_in_stock > 0
    }

    /// Unit price after the book's own discount.
    pub fn discounted_price(&self) -> Money {
        self.price.discounted(self.discount)
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Create/update payload for a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub name: String,
    pub price: Money,
    pub number_in_stock: i64,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub image_ids: Vec<ImageId>,
    pub book_series: BookSeriesId,
    pub book_type: BookTypeId,
    pub page_type: PageTypeId,
    pub cover_type: CoverTypeId,
    pub language: LanguageId,
    #[serde(default)]
    pub authors: Vec<AuthorId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub number_of_pages: Option<u32>,
    #[serde(default)]
    pub publishing_year: Option<i32>,
}
