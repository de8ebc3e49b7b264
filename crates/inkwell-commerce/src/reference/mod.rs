//! Reference entities: authors, book types, cover types, languages, page
//! types, publishing houses, book series and deliveries.
//!
//! All of them go through one [`ReferenceService`], configured per entity by
//! a [`ReferenceKind`].

mod entities;
mod kind;
mod service;

pub use entities::{
    Author, AuthorInput, BookSeries, BookSeriesInput, BookType, CoverType, Delivery,
    DeliveryInput, Language, NameInput, PageType, PublishingHouse, PublishingHouseInput,
    TRACKING_NUMBER_PLACEHOLDER,
};
pub use kind::{
    ReferenceKind, Uniqueness, UsageCheck, AUTHOR, BOOK_SERIES, BOOK_TYPE, COVER_TYPE, DELIVERY,
    LANGUAGE, PAGE_TYPE, PUBLISHING_HOUSE, REFERENCE_KINDS,
};
pub use service::{NameQuery, ReferenceService};

use inkwell_db::Document;
use serde::de::DeserializeOwned;

use crate::error::CommerceError;

/// A document managed by the generic reference service.
pub trait ReferenceEntity: Document + Clone {
    /// Configuration of this entity.
    const KIND: ReferenceKind;

    /// Create/update payload.
    type Input: DeserializeOwned;

    /// Build a new entity with a fresh id.
    fn from_input(input: Self::Input) -> Self;

    /// Overwrite the editable fields.
    fn apply(&mut self, input: Self::Input);

    fn name(&self) -> &str;

    fn name_mut(&mut self) -> &mut String;

    /// Field and value that names must be unique within, if any.
    fn scope(&self) -> Option<(&'static str, &str)> {
        None
    }

    /// Entities this one points at, which must exist.
    fn parents(&self) -> Vec<(ReferenceKind, String)> {
        Vec::new()
    }

    /// Entity-specific checks beyond the name.
    fn validate(&self) -> Result<(), CommerceError> {
        Ok(())
    }
}
