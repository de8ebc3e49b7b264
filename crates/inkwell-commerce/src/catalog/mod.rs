//! Book catalog: documents, list filters, joined views and the service.

mod book;
mod query;
mod service;
mod view;

pub use book::{Book, BookInput};
pub use query::{BookFilters, BOOK_SORTABLE};
pub use service::CatalogService;
pub use view::BookView;
