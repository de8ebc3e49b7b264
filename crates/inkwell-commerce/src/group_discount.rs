//! Group discounts: a percentage off when a fixed set of books is bought
//! together.

use std::collections::BTreeSet;

use inkwell_db::{Db, Document, Filter};
use serde::{Deserialize, Serialize};

use crate::catalog::{Book, BookView};
use crate::error::CommerceError;
use crate::ids::{BookId, GroupDiscountId};
use crate::page::{Page, PageSettings};

const SORTABLE: &[(&str, &str)] = &[("discount", "discount"), ("createdAt", "createdAt")];

/// A discount applied to a set of at least two distinct books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDiscount {
    pub id: GroupDiscountId,
    pub books: Vec<BookId>,
    /// Percent in (0, 100].
    pub discount: f64,
    pub created_at: i64,
}

impl Document for GroupDiscount {
    const COLLECTION: &'static str = "groupDiscounts";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl GroupDiscount {
    /// The book set, order-independent.
    pub fn book_set(&self) -> BTreeSet<&BookId> {
        self.books.iter().collect()
    }

    pub fn contains(&self, book_id: &BookId) -> bool {
        self.books.contains(book_id)
    }
}

/// Create/update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDiscountInput {
    pub books: Vec<BookId>,
    pub discount: f64,
}

/// A group discount with its books resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDiscountView {
    pub id: GroupDiscountId,
    pub books: Vec<BookView>,
    pub discount: f64,
    pub created_at: i64,
}

/// Group discount list query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDiscountQuery {
    /// Only discounts containing this book.
    #[serde(default)]
    pub book: Option<BookId>,
    #[serde(flatten)]
    pub page: PageSettings,
}

/// Group discount operations.
pub struct GroupDiscountService<'a> {
    db: &'a Db,
}

impl<'a> GroupDiscountService<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    pub fn get(&self, id: &str) -> Result<GroupDiscount, CommerceError> {
        self.db
            .get::<GroupDiscount>(id)?
            .ok_or_else(|| CommerceError::not_found("Group discount", id))
    }

    pub fn view(&self, discount: GroupDiscount) -> Result<GroupDiscountView, CommerceError> {
        let mut books = Vec::with_capacity(discount.books.len());
        for id in &discount.books {
            if let Some(book) = self.db.get::<Book>(id.as_str())? {
                books.push(BookView::resolve(self.db, book)?);
            }
        }
        Ok(GroupDiscountView {
            id: discount.id,
            books,
            discount: discount.discount,
            created_at: discount.created_at,
        })
    }

    pub fn list(&self, query: &GroupDiscountQuery) -> Result<Page<GroupDiscount>, CommerceError> {
        let filter = match &query.book {
            Some(book) => Filter::contains("books", book),
            None => Filter::All,
        };
        let options = query.page.find_options(SORTABLE, "createdAt")?;
        let total = self.db.count::<GroupDiscount>(&filter)?;
        let items = self.db.find::<GroupDiscount>(&filter, &options)?;
        Ok(Page::new(items, total, &query.page))
    }

    /// Every group discount, in creation order.
    pub fn all(&self) -> Result<Vec<GroupDiscount>, CommerceError> {
        Ok(self.db.all::<GroupDiscount>()?)
    }

    /// Group discounts that include a book.
    pub fn containing(&self, book_id: &BookId) -> Result<Vec<GroupDiscount>, CommerceError> {
        let filter = Filter::contains("books", book_id);
        Ok(self.db.find(&filter, &Default::default())?)
    }

    pub fn create(&self, input: GroupDiscountInput) -> Result<GroupDiscount, CommerceError> {
        let discount = GroupDiscount {
            id: GroupDiscountId::generate(),
            books: input.books,
            discount: input.discount,
            created_at: crate::current_timestamp(),
        };
        self.check(&discount)?;
        self.db.insert(&discount)?;
        tracing::info!(
            id = %discount.id,
            books = discount.books.len(),
            discount = discount.discount,
            "created group discount"
        );
        Ok(discount)
    }

    pub fn update(
        &self,
        id: &str,
        input: GroupDiscountInput,
    ) -> Result<GroupDiscount, CommerceError> {
        let mut discount = self.get(id)?;
        discount.books = input.books;
        discount.discount = input.discount;
        self.check(&discount)?;
        self.db.replace(&discount)?;
        tracing::info!(id, "updated group discount");
        Ok(discount)
    }

    /// Delete a group discount and drop it from every basket.
    pub fn delete(&self, id: &str) -> Result<GroupDiscount, CommerceError> {
        let discount = self.get(id)?;
        self.db.delete::<GroupDiscount>(id)?;
        let baskets = self
            .db
            .update_where::<crate::user::User, _>(&Filter::All, |user| {
                user.basket.remove_group_discount(&discount.id)
            })?;
        tracing::info!(id, baskets, "deleted group discount");
        Ok(discount)
    }

    fn check(&self, discount: &GroupDiscount) -> Result<(), CommerceError> {
        if !(discount.discount > 0.0 && discount.discount <= 100.0) {
            return Err(CommerceError::BadData(format!(
                "group discount {} is outside (0, 100]",
                discount.discount
            )));
        }

        let set = discount.book_set();
        if set.len() != discount.books.len() {
            return Err(CommerceError::InvalidData(
                "group discount lists a book twice".into(),
            ));
        }
        if set.len() < 2 {
            return Err(CommerceError::InvalidData(
                "group discount needs at least two books".into(),
            ));
        }

        for book_id in &discount.books {
            if self.db.get::<Book>(book_id.as_str())?.is_none() {
                return Err(CommerceError::InvalidData(format!(
                    "book {} does not exist",
                    book_id
                )));
            }
        }

        for other in self.all()? {
            if other.id != discount.id && other.book_set() == set {
                return Err(CommerceError::Duplicate {
                    entity: "Group discount",
                    name: discount
                        .books
                        .iter()
                        .map(BookId::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(())
    }
}
