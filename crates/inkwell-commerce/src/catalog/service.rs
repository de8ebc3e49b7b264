//! Book CRUD, listing and stock.

use inkwell_db::{Db, Filter};

use super::query::BOOK_SORTABLE;
use super::{Book, BookFilters, BookInput, BookView};
use crate::error::CommerceError;
use crate::group_discount::GroupDiscount;
use crate::ids::{BookId, BookSeriesId};
use crate::page::{Page, PageSettings};
use crate::reference::{
    BookSeries, ReferenceKind, AUTHOR, BOOK_SERIES, BOOK_TYPE, COVER_TYPE, LANGUAGE, PAGE_TYPE,
};
use crate::user::User;

/// Catalog operations.
pub struct CatalogService<'a> {
    db: &'a Db,
}

impl<'a> CatalogService<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    pub fn get(&self, id: &str) -> Result<Book, CommerceError> {
        self.db
            .get::<Book>(id)?
            .ok_or_else(|| CommerceError::not_found("Book", id))
    }

    pub fn view(&self, id: &str) -> Result<BookView, CommerceError> {
        BookView::resolve(self.db, self.get(id)?)
    }

    /// Books by id, in the given order, skipping ids that no longer exist.
    pub fn books(&self, ids: &[BookId]) -> Result<Vec<Book>, CommerceError> {
        let mut books = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(book) = self.db.get::<Book>(id.as_str())? {
                books.push(book);
            }
        }
        Ok(books)
    }

    /// One page of books matching `filters`.
    pub fn list_books(
        &self,
        settings: &PageSettings,
        filters: &BookFilters,
    ) -> Result<Page<BookView>, CommerceError> {
        let house_series = match &filters.publishing_house {
            Some(house) => Some(self.series_of_house(house.as_str())?),
            None => None,
        };
        let filter = filters.to_filter(house_series.as_deref());
        let options = settings.find_options(BOOK_SORTABLE, "createdAt")?;

        let total = self.db.count::<Book>(&filter)?;
        let books = self.db.find::<Book>(&filter, &options)?;
        tracing::debug!(total, page = settings.page, "listed books");

        let items = books
            .into_iter()
            .map(|book| BookView::resolve(self.db, book))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, settings))
    }

    pub fn create(&self, input: BookInput) -> Result<Book, CommerceError> {
        let book = Book::from_input(input);
        book.validate()?;
        self.check_references(&book)?;
        self.db.insert(&book)?;
        tracing::info!(id = %book.id, name = %book.name, "created book");
        Ok(book)
    }

    pub fn update(&self, id: &str, input: BookInput) -> Result<Book, CommerceError> {
        let mut book = self.get(id)?;
        book.apply(input);
        book.validate()?;
        self.check_references(&book)?;
        self.db.replace(&book)?;
        tracing::info!(id, "updated book");
        Ok(book)
    }

    /// Delete a book that no group discount includes, then drop it from
    /// every user's basket, likes and recently viewed list.
    pub fn delete(&self, id: &str) -> Result<Book, CommerceError> {
        let book = self.get(id)?;
        let bundles = self
            .db
            .count::<GroupDiscount>(&Filter::contains("books", &book.id))?;
        if bundles > 0 {
            return Err(CommerceError::InUse {
                entity: "Book",
                id: id.to_string(),
                by: "group discounts",
                count: bundles,
            });
        }

        self.db.delete::<Book>(id)?;
        let users = self
            .db
            .update_where::<User, _>(&Filter::All, |user| user.forget_book(&book.id))?;
        tracing::info!(id, users, "deleted book");
        Ok(book)
    }

    /// Change stock by `delta`; the result may not go below zero.
    pub fn adjust_stock(&self, id: &str, delta: i64) -> Result<Book, CommerceError> {
        let _guard = self.db.exclusive()?;
        self.apply_stock_delta(id, delta)
    }

    /// [`CatalogService::adjust_stock`] for a caller already inside
    /// [`Db::exclusive`].
    pub(crate) fn apply_stock_delta(&self, id: &str, delta: i64) -> Result<Book, CommerceError> {
        let mut book = self.get(id)?;
        let next = book
            .number_in_stock
            .checked_add(delta)
            .ok_or(CommerceError::Overflow)?;
        if next < 0 {
            return Err(CommerceError::InsufficientStock {
                name: book.name,
                requested: -delta,
                available: book.number_in_stock,
            });
        }
        book.number_in_stock = next;
        self.db.replace(&book)?;
        tracing::debug!(id, delta, stock = next, "adjusted stock");
        Ok(book)
    }

    fn series_of_house(&self, house: &str) -> Result<Vec<BookSeriesId>, CommerceError> {
        let series = self
            .db
            .find::<BookSeries>(&Filter::eq("publishingHouse", house), &Default::default())?;
        Ok(series.into_iter().map(|s| s.id).collect())
    }

    fn check_references(&self, book: &Book) -> Result<(), CommerceError> {
        let mut refs: Vec<(ReferenceKind, &str)> = vec![
            (BOOK_SERIES, book.book_series.as_str()),
            (BOOK_TYPE, book.book_type.as_str()),
            (PAGE_TYPE, book.page_type.as_str()),
            (COVER_TYPE, book.cover_type.as_str()),
            (LANGUAGE, book.language.as_str()),
        ];
        refs.extend(book.authors.iter().map(|a| (AUTHOR, a.as_str())));

        for (kind, id) in refs {
            if !self.db.contains_in(kind.collection, id)? {
                return Err(CommerceError::InvalidData(format!(
                    "{} {} does not exist",
                    kind.entity, id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::group_discount::{GroupDiscountInput, GroupDiscountService};
    use crate::money::{Currency, Money};
    use crate::reference::{Language, NameInput, ReferenceService};
    use crate::testing::{seed_book, seed_user, Fixture};
    use inkwell_db::SortOrder;

    #[test]
    fn test_create_checks_references() {
        let fx = Fixture::new();
        let mut input = fx.book_input("Kobzar", 10000, 1);
        input.language = "klingon".into();
        let err = CatalogService::new(&fx.db).create(input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);

        let mut input = fx.book_input("Kobzar", 10000, 1);
        input.authors = vec!["ghost".into()];
        let err = CatalogService::new(&fx.db).create(input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
    }

    #[test]
    fn test_create_rejects_bad_numbers() {
        let fx = Fixture::new();
        let mut input = fx.book_input("Kobzar", 10000, 1);
        input.discount = Some(101.0);
        let err = CatalogService::new(&fx.db).create(input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadData);
        assert_eq!(fx.db.count::<Book>(&Filter::All).unwrap(), 0);
    }

    #[test]
    fn test_update_missing_book() {
        let fx = Fixture::new();
        let err = CatalogService::new(&fx.db)
            .update("nope", fx.book_input("X", 1, 1))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_list_sort_and_page() {
        let fx = Fixture::new();
        seed_book(&fx, "Zapovit", 30000, 1);
        seed_book(&fx, "Kobzar", 10000, 0);
        seed_book(&fx, "Eneida", 20000, 4);

        let catalog = CatalogService::new(&fx.db);
        let settings = PageSettings::new(0, 2).ordered_by("price", SortOrder::Desc);
        let page = catalog.list_books(&settings, &BookFilters::default()).unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
        let names: Vec<&str> = page.items.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Zapovit", "Eneida"]);

        let in_stock = BookFilters {
            in_stock_only: true,
            ..Default::default()
        };
        let settings = PageSettings::default().ordered_by("name", SortOrder::Asc);
        let page = catalog.list_books(&settings, &in_stock).unwrap();
        let names: Vec<&str> = page.items.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Eneida", "Zapovit"]);
    }

    #[test]
    fn test_list_joins_references() {
        let fx = Fixture::new();
        seed_book(&fx, "Kobzar", 10000, 1);
        let page = CatalogService::new(&fx.db)
            .list_books(&PageSettings::default(), &BookFilters::default())
            .unwrap();
        let view = &page.items[0];
        assert_eq!(view.language.as_ref().unwrap().name, "Ukrainian");
        assert_eq!(view.publishing_house.as_ref().unwrap().name, "Folio");
        assert_eq!(view.authors[0].name, "Taras Shevchenko");
    }

    #[test]
    fn test_filter_by_publishing_house() {
        let fx = Fixture::new();
        seed_book(&fx, "Kobzar", 10000, 1);
        let catalog = CatalogService::new(&fx.db);

        let filters = BookFilters {
            publishing_house: Some(fx.house.id.clone()),
            ..Default::default()
        };
        let page = catalog.list_books(&PageSettings::default(), &filters).unwrap();
        assert_eq!(page.total_count, 1);

        let filters = BookFilters {
            publishing_house: Some("elsewhere".into()),
            ..Default::default()
        };
        let page = catalog.list_books(&PageSettings::default(), &filters).unwrap();
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn test_unknown_sort_field() {
        let fx = Fixture::new();
        let settings = PageSettings::default().ordered_by("weight", SortOrder::Asc);
        let err = CatalogService::new(&fx.db)
            .list_books(&settings, &BookFilters::default())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
    }

    #[test]
    fn test_delete_referenced_language_leaves_book() {
        let fx = Fixture::new();
        let book = seed_book(&fx, "Kobzar", 10000, 1);
        let languages = ReferenceService::<Language>::new(&fx.db);

        let err = languages.delete(fx.language.id.as_str()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
        assert!(languages.get(fx.language.id.as_str()).is_ok());
        assert_eq!(
            CatalogService::new(&fx.db).get(book.id.as_str()).unwrap().language,
            fx.language.id
        );

        let unused = languages.create(NameInput::new("Latin")).unwrap();
        assert!(languages.delete(unused.id.as_str()).is_ok());
    }

    #[test]
    fn test_delete_book_in_group_discount() {
        let fx = Fixture::new();
        let a = seed_book(&fx, "A", 10000, 1);
        let b = seed_book(&fx, "B", 10000, 1);
        GroupDiscountService::new(&fx.db)
            .create(GroupDiscountInput {
                books: vec![a.id.clone(), b.id.clone()],
                discount: 10.0,
            })
            .unwrap();

        let err = CatalogService::new(&fx.db).delete(a.id.as_str()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
    }

    #[test]
    fn test_delete_book_cleans_users() {
        let fx = Fixture::new();
        let book = seed_book(&fx, "Kobzar", 10000, 5);
        let mut user = seed_user(&fx, "reader@example.com");
        user.basket.add_book(&book.id, 2, 99).unwrap();
        user.liked_book_ids.push(book.id.clone());
        user.recently_viewed_book_ids.push(book.id.clone());
        fx.db.replace(&user).unwrap();

        CatalogService::new(&fx.db).delete(book.id.as_str()).unwrap();
        let user: User = fx.db.get(user.id.as_str()).unwrap().unwrap();
        assert!(user.basket.items.is_empty());
        assert!(user.liked_book_ids.is_empty());
        assert!(user.recently_viewed_book_ids.is_empty());
    }

    #[test]
    fn test_adjust_stock() {
        let fx = Fixture::new();
        let book = seed_book(&fx, "Kobzar", 10000, 2);
        let catalog = CatalogService::new(&fx.db);

        assert_eq!(catalog.adjust_stock(book.id.as_str(), -2).unwrap().number_in_stock, 0);
        let err = catalog.adjust_stock(book.id.as_str(), -1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadData);
        assert_eq!(catalog.adjust_stock(book.id.as_str(), 5).unwrap().number_in_stock, 5);
    }

    #[test]
    fn test_price_filter_uses_minor_units() {
        let fx = Fixture::new();
        seed_book(&fx, "Cheap", 9999, 1);
        seed_book(&fx, "Dear", 10000, 1);
        let filters = BookFilters {
            price_min: Some(Money::new(10000, Currency::UAH)),
            ..Default::default()
        };
        let page = CatalogService::new(&fx.db)
            .list_books(&PageSettings::default(), &filters)
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].name, "Dear");
    }
}
