//! Books joined with their reference entities.

use inkwell_db::{Db, Document};
use serde::{Deserialize, Serialize};

use super::Book;
use crate::error::CommerceError;
use crate::ids::{BookId, ImageId};
use crate::money::Money;
use crate::reference::{
    Author, BookSeries, BookType, CoverType, Language, PageType, PublishingHouse,
};

/// A book as shown to clients: references resolved to full entities.
///
/// A reference that has gone missing resolves to `None` (or is left out of
/// `authors`) rather than failing the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: BookId,
    pub name: String,
    pub price: Money,
    /// Price after the book's own discount.
    pub discounted_price: Money,
    pub number_in_stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub image_ids: Vec<ImageId>,
    pub book_series: Option<BookSeries>,
    pub publishing_house: Option<PublishingHouse>,
    pub book_type: Option<BookType>,
    pub page_type: Option<PageType>,
    pub cover_type: Option<CoverType>,
    pub language: Option<Language>,
    pub authors: Vec<Author>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishing_year: Option<i32>,
    pub created_at: i64,
}

impl BookView {
    /// Resolve a book's references.
    pub fn resolve(db: &Db, book: Book) -> Result<Self, CommerceError> {
        let book_series: Option<BookSeries> = db.get(book.book_series.as_str())?;
        let publishing_house = match &book_series {
            Some(series) => db.get::<PublishingHouse>(series.publishing_house.as_str())?,
            None => None,
        };

        let mut authors = Vec::with_capacity(book.authors.len());
        for id in &book.authors {
            if let Some(author) = db.get::<Author>(id.as_str())? {
                authors.push(author);
            }
        }

        Ok(Self {
            discounted_price: book.discounted_price(),
            book_type: lookup(db, book.book_type.as_str())?,
            page_type: lookup(db, book.page_type.as_str())?,
            cover_type: lookup(db, book.cover_type.as_str())?,
            language: lookup(db, book.language.as_str())?,
            book_series,
            publishing_house,
            authors,
            id: book.id,
            name: book.name,
            price: book.price,
            number_in_stock: book.number_in_stock,
            discount: book.discount,
            image_ids: book.image_ids,
            tags: book.tags,
            description: book.description,
            isbn: book.isbn,
            number_of_pages: book.number_of_pages,
            publishing_year: book.publishing_year,
            created_at: book.created_at,
        })
    }
}

fn lookup<D: Document>(db: &Db, id: &str) -> Result<Option<D>, CommerceError> {
    Ok(db.get::<D>(id)?)
}
