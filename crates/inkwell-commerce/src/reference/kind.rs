//! Configuration table for reference entities.
//!
//! Every reference entity shares the same list/create/update/delete
//! behaviour; what differs is captured here: how names collide and which
//! documents must not point at an entity when it is deleted.

use inkwell_db::Document;

use crate::catalog::Book;
use crate::order::Order;

/// How two names are compared for uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    /// "Folio" and "folio" are different names.
    CaseSensitive,
    /// "Folio" and "folio" collide.
    CaseInsensitive,
}

impl Uniqueness {
    pub fn is_case_sensitive(&self) -> bool {
        matches!(self, Uniqueness::CaseSensitive)
    }
}

/// A place where an entity id may be referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCheck {
    /// Collection holding the referencing documents.
    pub collection: &'static str,
    /// Field holding the id.
    pub field: &'static str,
    /// Whether the field is an array of ids.
    pub many: bool,
    /// Plural noun for error messages.
    pub label: &'static str,
}

/// Per-entity configuration of the generic reference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceKind {
    /// Display name.
    pub entity: &'static str,
    /// Collection name.
    pub collection: &'static str,
    /// Name collision rule.
    pub uniqueness: Uniqueness,
    /// Usage checks run before deletion.
    pub usage: &'static [UsageCheck],
}

const fn book_field(field: &'static str, many: bool) -> UsageCheck {
    UsageCheck {
        collection: Book::COLLECTION,
        field,
        many,
        label: "books",
    }
}

pub const AUTHOR: ReferenceKind = ReferenceKind {
    entity: "Author",
    collection: "authors",
    uniqueness: Uniqueness::CaseSensitive,
    usage: &[book_field("authors", true)],
};

pub const BOOK_TYPE: ReferenceKind = ReferenceKind {
    entity: "Book type",
    collection: "bookTypes",
    uniqueness: Uniqueness::CaseInsensitive,
    usage: &[book_field("bookType", false)],
};

pub const COVER_TYPE: ReferenceKind = ReferenceKind {
    entity: "Cover type",
    collection: "coverTypes",
    uniqueness: Uniqueness::CaseInsensitive,
    usage: &[book_field("coverType", false)],
};

pub const LANGUAGE: ReferenceKind = ReferenceKind {
    entity: "Language",
    collection: "languages",
    uniqueness: Uniqueness::CaseInsensitive,
    usage: &[book_field("language", false)],
};

pub const PAGE_TYPE: ReferenceKind = ReferenceKind {
    entity: "Page type",
    collection: "pageTypes",
    uniqueness: Uniqueness::CaseInsensitive,
    usage: &[book_field("pageType", false)],
};

pub const PUBLISHING_HOUSE: ReferenceKind = ReferenceKind {
    entity: "Publishing house",
    collection: "publishingHouses",
    uniqueness: Uniqueness::CaseSensitive,
    usage: &[UsageCheck {
        collection: BOOK_SERIES.collection,
        field: "publishingHouse",
        many: false,
        label: "book series",
    }],
};

/// Series names are unique within one publishing house.
pub const BOOK_SERIES: ReferenceKind = ReferenceKind {
    entity: "Book series",
    collection: "bookSeries",
    uniqueness: Uniqueness::CaseSensitive,
    usage: &[book_field("bookSeries", false)],
};

pub const DELIVERY: ReferenceKind = ReferenceKind {
    entity: "Delivery",
    collection: "deliveries",
    uniqueness: Uniqueness::CaseSensitive,
    usage: &[UsageCheck {
        collection: Order::COLLECTION,
        field: "delivery",
        many: false,
        label: "orders",
    }],
};

/// All reference entity kinds.
pub const REFERENCE_KINDS: &[ReferenceKind] = &[
    AUTHOR,
    BOOK_TYPE,
    COVER_TYPE,
    LANGUAGE,
    PAGE_TYPE,
    PUBLISHING_HOUSE,
    BOOK_SERIES,
    DELIVERY,
];
