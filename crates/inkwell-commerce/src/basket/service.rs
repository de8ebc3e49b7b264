//! Basket operations on a user's stored basket.

use std::collections::HashMap;

use inkwell_db::Db;
use serde::{Deserialize, Serialize};

use super::pricing::{price_basket, BookLine, BundleLine, GroupOffer, PricedBook};
use super::{Basket, BasketPricing, ReconcileReport};
use crate::catalog::Book;
use crate::error::CommerceError;
use crate::group_discount::GroupDiscount;
use crate::ids::{BookId, GroupDiscountId};
use crate::settings::ShopSettings;
use crate::user::User;

/// A basket with its pricing, totals rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketQuote {
    #[serde(flatten)]
    pub basket: Basket,
    pub pricing: BasketPricing,
    pub final_sum: String,
    pub final_sum_with_discounts: String,
}

/// Basket result after a change that reconciles against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledBasket {
    #[serde(flatten)]
    pub basket: Basket,
    pub report: ReconcileReport,
}

impl BasketPricing {
    fn into_quote(self, basket: Basket) -> BasketQuote {
        BasketQuote {
            final_sum: self.final_sum.display_amount(),
            final_sum_with_discounts: self.final_sum_with_discounts.display_amount(),
            basket,
            pricing: self,
        }
    }
}

/// Basket operations.
pub struct BasketService<'a> {
    db: &'a Db,
    settings: &'a ShopSettings,
}

impl<'a> BasketService<'a> {
    pub fn new(db: &'a Db, settings: &'a ShopSettings) -> Self {
        Self { db, settings }
    }

    pub fn get(&self, user_id: &str) -> Result<Basket, CommerceError> {
        Ok(self.user(user_id)?.basket)
    }

    pub fn add_book(
        &self,
        user_id: &str,
        book_id: &BookId,
        count: i64,
    ) -> Result<Basket, CommerceError> {
        self.require_book(book_id)?;
        let max = self.settings.max_count_per_line;
        self.modify(user_id, |basket| basket.add_book(book_id, count, max).map(drop))
    }

    /// Set a book's count; zero or less removes the line.
    pub fn set_book_count(
        &self,
        user_id: &str,
        book_id: &BookId,
        count: i64,
    ) -> Result<Basket, CommerceError> {
        if count > 0 {
            self.require_book(book_id)?;
        }
        let max = self.settings.max_count_per_line;
        self.modify(user_id, |basket| {
            basket.set_book_count(book_id, count, max);
            Ok(())
        })
    }

    pub fn remove_book(&self, user_id: &str, book_id: &BookId) -> Result<Basket, CommerceError> {
        self.modify(user_id, |basket| {
            basket.remove_book(book_id);
            Ok(())
        })
    }

    pub fn add_group_discount(
        &self,
        user_id: &str,
        id: &GroupDiscountId,
        count: i64,
    ) -> Result<Basket, CommerceError> {
        self.require_group_discount(id)?;
        let max = self.settings.max_count_per_line;
        self.modify(user_id, |basket| {
            basket.add_group_discount(id, count, max).map(drop)
        })
    }

    pub fn set_group_discount_count(
        &self,
        user_id: &str,
        id: &GroupDiscountId,
        count: i64,
    ) -> Result<Basket, CommerceError> {
        if count > 0 {
            self.require_group_discount(id)?;
        }
        let max = self.settings.max_count_per_line;
        self.modify(user_id, |basket| {
            basket.set_group_discount_count(id, count, max);
            Ok(())
        })
    }

    pub fn remove_group_discount(
        &self,
        user_id: &str,
        id: &GroupDiscountId,
    ) -> Result<Basket, CommerceError> {
        self.modify(user_id, |basket| {
            basket.remove_group_discount(id);
            Ok(())
        })
    }

    pub fn clear(&self, user_id: &str) -> Result<Basket, CommerceError> {
        self.modify(user_id, |basket| {
            basket.clear();
            Ok(())
        })
    }

    /// Merge a client-side basket into the stored one on login, then
    /// reconcile the result.
    pub fn merge(&self, user_id: &str, incoming: &Basket) -> Result<ReconciledBasket, CommerceError> {
        let mut user = self.user(user_id)?;
        user.basket.merge(incoming, self.settings.max_count_per_line);
        let report = self.reconcile_basket(&mut user.basket)?;
        self.db.replace(&user)?;
        tracing::info!(
            user = user_id,
            items = user.basket.items.len(),
            "merged basket"
        );
        Ok(ReconciledBasket {
            basket: user.basket,
            report,
        })
    }

    /// Drop vanished lines and clamp counts to stock.
    pub fn reconcile(&self, user_id: &str) -> Result<ReconciledBasket, CommerceError> {
        let mut user = self.user(user_id)?;
        let report = self.reconcile_basket(&mut user.basket)?;
        if !report.is_clean() {
            self.db.replace(&user)?;
            tracing::info!(user = user_id, ?report, "reconciled basket");
        }
        Ok(ReconciledBasket {
            basket: user.basket,
            report,
        })
    }

    /// Price the user's stored basket.
    pub fn price(&self, user_id: &str) -> Result<BasketQuote, CommerceError> {
        let basket = self.get(user_id)?;
        Ok(self.quote(&basket)?.into_quote(basket))
    }

    /// Price any basket against the current catalog.
    ///
    /// Lines whose book or group discount no longer exists are skipped.
    pub fn quote(&self, basket: &Basket) -> Result<BasketPricing, CommerceError> {
        let mut lines = Vec::with_capacity(basket.items.len());
        for item in &basket.items {
            if let Some(book) = self.db.get::<Book>(item.book_id.as_str())? {
                lines.push(BookLine {
                    book: priced(&book),
                    count: item.count,
                });
            }
        }

        let mut bundles = Vec::with_capacity(basket.group_discounts.len());
        for line in &basket.group_discounts {
            let Some(discount) = self
                .db
                .get::<GroupDiscount>(line.group_discount_id.as_str())?
            else {
                continue;
            };
            if let Some(books) = self.priced_books(&discount.books)? {
                bundles.push(BundleLine {
                    group_discount_id: discount.id,
                    discount: discount.discount,
                    books,
                    count: line.count,
                });
            }
        }

        let offers: Vec<GroupOffer> = self
            .db
            .all::<GroupDiscount>()?
            .into_iter()
            .map(|g| GroupOffer {
                group_discount_id: g.id,
                books: g.books,
                discount: g.discount,
            })
            .collect();

        price_basket(
            &lines,
            &bundles,
            &offers,
            self.settings.discount_precedence,
            self.settings.currency,
        )
    }

    /// Reconcile a basket in place against the whole catalog.
    pub(crate) fn reconcile_basket(
        &self,
        basket: &mut Basket,
    ) -> Result<ReconcileReport, CommerceError> {
        let stock: HashMap<BookId, i64> = self
            .db
            .all::<Book>()?
            .into_iter()
            .map(|b| (b.id, b.number_in_stock))
            .collect();
        let bundles: HashMap<GroupDiscountId, Vec<BookId>> = self
            .db
            .all::<GroupDiscount>()?
            .into_iter()
            .map(|g| (g.id, g.books))
            .collect();
        Ok(basket.reconcile(&stock, &bundles))
    }

    /// All books of a set, or `None` if any is gone.
    fn priced_books(&self, ids: &[BookId]) -> Result<Option<Vec<PricedBook>>, CommerceError> {
        let mut books = Vec::with_capacity(ids.len());
        for id in ids {
            match self.db.get::<Book>(id.as_str())? {
                Some(book) => books.push(priced(&book)),
                None => return Ok(None),
            }
        }
        Ok(Some(books))
    }

    fn modify<F>(&self, user_id: &str, change: F) -> Result<Basket, CommerceError>
    where
        F: FnOnce(&mut Basket) -> Result<(), CommerceError>,
    {
        let mut user = self.user(user_id)?;
        change(&mut user.basket)?;
        self.db.replace(&user)?;
        Ok(user.basket)
    }

    fn user(&self, user_id: &str) -> Result<User, CommerceError> {
        self.db
            .get::<User>(user_id)?
            .ok_or_else(|| CommerceError::not_found("User", user_id))
    }

    fn require_book(&self, id: &BookId) -> Result<(), CommerceError> {
        match self.db.get::<Book>(id.as_str())? {
            Some(_) => Ok(()),
            None => Err(CommerceError::not_found("Book", id.as_str())),
        }
    }

    fn require_group_discount(&self, id: &GroupDiscountId) -> Result<(), CommerceError> {
        match self.db.get::<GroupDiscount>(id.as_str())? {
            Some(_) => Ok(()),
            None => Err(CommerceError::not_found("Group discount", id.as_str())),
        }
    }
}

fn priced(book: &Book) -> PricedBook {
    PricedBook {
        book_id: book.id.clone(),
        name: book.name.clone(),
        price: book.price,
        discount: book.discount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogService;
    use crate::error::ErrorCode;
    use crate::group_discount::{GroupDiscountInput, GroupDiscountService};
    use crate::testing::{seed_book, seed_user, Fixture};

    #[test]
    fn test_add_unknown_book() {
        let fx = Fixture::new();
        let user = seed_user(&fx, "a@example.com");
        let err = BasketService::new(&fx.db, &fx.settings)
            .add_book(user.id.as_str(), &BookId::new("nope"), 1)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_add_and_price() {
        let fx = Fixture::new();
        let user = seed_user(&fx, "a@example.com");
        let a = seed_book(&fx, "A", 12000, 5);
        let b = seed_book(&fx, "B", 8000, 5);
        let baskets = BasketService::new(&fx.db, &fx.settings);

        baskets.add_book(user.id.as_str(), &a.id, 1).unwrap();
        baskets.add_book(user.id.as_str(), &a.id, 1).unwrap();
        baskets.add_book(user.id.as_str(), &b.id, 1).unwrap();

        let quote = baskets.price(user.id.as_str()).unwrap();
        assert_eq!(quote.basket.book_count(&a.id), 2);
        assert_eq!(quote.final_sum, "320.00");
        assert_eq!(quote.final_sum_with_discounts, "320.00");
    }

    #[test]
    fn test_group_discount_applies_when_all_books_present() {
        let fx = Fixture::new();
        let user = seed_user(&fx, "a@example.com");
        let a = seed_book(&fx, "A", 10000, 5);
        let b = seed_book(&fx, "B", 10000, 5);
        GroupDiscountService::new(&fx.db)
            .create(GroupDiscountInput {
                books: vec![a.id.clone(), b.id.clone()],
                discount: 10.0,
            })
            .unwrap();
        let baskets = BasketService::new(&fx.db, &fx.settings);

        baskets.add_book(user.id.as_str(), &a.id, 1).unwrap();
        let quote = baskets.price(user.id.as_str()).unwrap();
        assert_eq!(quote.final_sum_with_discounts, "100.00");

        baskets.add_book(user.id.as_str(), &b.id, 1).unwrap();
        let quote = baskets.price(user.id.as_str()).unwrap();
        assert_eq!(quote.final_sum, "200.00");
        assert_eq!(quote.final_sum_with_discounts, "180.00");
    }

    #[test]
    fn test_bundle_line() {
        let fx = Fixture::new();
        let user = seed_user(&fx, "a@example.com");
        let a = seed_book(&fx, "A", 10000, 5);
        let b = seed_book(&fx, "B", 5000, 5);
        let group = GroupDiscountService::new(&fx.db)
            .create(GroupDiscountInput {
                books: vec![a.id.clone(), b.id.clone()],
                discount: 20.0,
            })
            .unwrap();
        let baskets = BasketService::new(&fx.db, &fx.settings);
        baskets
            .add_group_discount(user.id.as_str(), &group.id, 2)
            .unwrap();

        let quote = baskets.price(user.id.as_str()).unwrap();
        assert_eq!(quote.final_sum, "300.00");
        assert_eq!(quote.final_sum_with_discounts, "240.00");
    }

    #[test]
    fn test_merge_caps_and_reconciles() {
        let fx = Fixture::new();
        let user = seed_user(&fx, "a@example.com");
        let a = seed_book(&fx, "A", 1000, 200);
        let scarce = seed_book(&fx, "Scarce", 1000, 1);
        let baskets = BasketService::new(&fx.db, &fx.settings);
        baskets.set_book_count(user.id.as_str(), &a.id, 80).unwrap();

        let mut local = Basket::default();
        local.set_book_count(&a.id, 50, 99);
        local.set_book_count(&scarce.id, 3, 99);
        local.set_book_count(&BookId::new("deleted"), 1, 99);

        let merged = baskets.merge(user.id.as_str(), &local).unwrap();
        assert_eq!(merged.basket.book_count(&a.id), 99);
        assert_eq!(merged.basket.book_count(&scarce.id), 1);
        assert_eq!(merged.report.removed_books, vec![BookId::new("deleted")]);
        assert_eq!(baskets.get(user.id.as_str()).unwrap(), merged.basket);
    }

    #[test]
    fn test_reconcile_after_stock_runs_out() {
        let fx = Fixture::new();
        let user = seed_user(&fx, "a@example.com");
        let a = seed_book(&fx, "A", 1000, 2);
        let baskets = BasketService::new(&fx.db, &fx.settings);
        baskets.add_book(user.id.as_str(), &a.id, 2).unwrap();

        CatalogService::new(&fx.db)
            .adjust_stock(a.id.as_str(), -2)
            .unwrap();
        let result = baskets.reconcile(user.id.as_str()).unwrap();
        assert!(result.basket.is_empty());
        assert_eq!(result.report.removed_books, vec![a.id.clone()]);
    }

    #[test]
    fn test_set_zero_removes_line() {
        let fx = Fixture::new();
        let user = seed_user(&fx, "a@example.com");
        let a = seed_book(&fx, "A", 1000, 2);
        let baskets = BasketService::new(&fx.db, &fx.settings);
        baskets.add_book(user.id.as_str(), &a.id, 2).unwrap();
        let basket = baskets.set_book_count(user.id.as_str(), &a.id, 0).unwrap();
        assert!(basket.is_empty());
    }
}
