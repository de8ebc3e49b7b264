//! Embedded JSON document database for the Inkwell bookstore.
//!
//! Collections hold serde documents keyed by id. Queries are expressed as
//! [`Filter`] predicates over the stored JSON plus [`FindOptions`] for
//! sorting and paging. The whole store can be snapshotted to a JSON file.
//!
//! # Example
//!
//! ```rust,ignore
//! use inkwell_db::{Db, Document, Filter, FindOptions, SortOrder};
//!
//! let db = Db::open("inkwell-data.json")?;
//! db.insert(&book)?;
//!
//! let cheap: Vec<Book> = db.find(
//!     &Filter::range("price.amountCents", None, Some(20000.0)),
//!     &FindOptions::new().sort_by("name", SortOrder::Asc).window(0, 25),
//! )?;
//! db.persist()?;
//! ```

mod db;
mod error;
mod filter;
mod types;

pub use db::Db;
pub use error::DbError;
pub use filter::{field_value, Filter};
pub use types::{compare_values, Document, FindOptions, Sort, SortOrder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Db, DbError, Document, Filter, FindOptions, SortOrder};
}
