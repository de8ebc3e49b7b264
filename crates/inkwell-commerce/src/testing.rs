//! Shared fixtures for unit tests.

use inkwell_db::Db;

use crate::catalog::{Book, BookInput, CatalogService};
use crate::money::{Currency, Money};
use crate::reference::{
    Author, AuthorInput, BookSeries, BookSeriesInput, BookType, CoverType, Language, NameInput,
    PageType, PublishingHouse, PublishingHouseInput, ReferenceService,
};
use crate::settings::ShopSettings;
use crate::user::{Role, User, UserInput, UserService};

/// A database holding one of every reference entity a book needs.
pub struct Fixture {
    pub db: Db,
    pub settings: ShopSettings,
    pub author: Author,
    pub book_type: BookType,
    pub cover_type: CoverType,
    pub page_type: PageType,
    pub language: Language,
    pub house: PublishingHouse,
    pub series: BookSeries,
}

impl Fixture {
    pub fn new() -> Self {
        let db = Db::in_memory();
        let author = ReferenceService::<Author>::new(&db)
            .create(AuthorInput {
                name: "Taras Shevchenko".to_string(),
                description: None,
            })
            .unwrap();
        let book_type = ReferenceService::<BookType>::new(&db)
            .create(NameInput::new("Paper"))
            .unwrap();
        let cover_type = ReferenceService::<CoverType>::new(&db)
            .create(NameInput::new("Hardcover"))
            .unwrap();
        let page_type = ReferenceService::<PageType>::new(&db)
            .create(NameInput::new("Offset"))
            .unwrap();
        let language = ReferenceService::<Language>::new(&db)
            .create(NameInput::new("Ukrainian"))
            .unwrap();
        let house = ReferenceService::<PublishingHouse>::new(&db)
            .create(PublishingHouseInput {
                name: "Folio".to_string(),
                tags: vec![],
            })
            .unwrap();
        let series = ReferenceService::<BookSeries>::new(&db)
            .create(BookSeriesInput {
                name: "Classics".to_string(),
                publishing_house: house.id.clone(),
                description: None,
            })
            .unwrap();

        Self {
            db,
            settings: ShopSettings::default(),
            author,
            book_type,
            cover_type,
            page_type,
            language,
            house,
            series,
        }
    }

    pub fn book_input(&self, name: &str, cents: i64, stock: i64) -> BookInput {
        BookInput {
            name: name.to_string(),
            price: Money::new(cents, Currency::UAH),
            number_in_stock: stock,
            discount: None,
            image_ids: vec![],
            book_series: self.series.id.clone(),
            book_type: self.book_type.id.clone(),
            page_type: self.page_type.id.clone(),
            cover_type: self.cover_type.id.clone(),
            language: self.language.id.clone(),
            authors: vec![self.author.id.clone()],
            tags: vec![],
            description: None,
            isbn: None,
            number_of_pages: None,
            publishing_year: None,
        }
    }
}

pub fn seed_book(fx: &Fixture, name: &str, cents: i64, stock: i64) -> Book {
    CatalogService::new(&fx.db)
        .create(fx.book_input(name, cents, stock))
        .unwrap()
}

pub fn seed_user(fx: &Fixture, email: &str) -> User {
    UserService::new(&fx.db, &fx.settings)
        .create(UserInput {
            email: email.to_string(),
            first_name: "Olena".to_string(),
            last_name: "Kovalenko".to_string(),
            phone: None,
            role: Role::Customer,
        })
        .unwrap()
}
