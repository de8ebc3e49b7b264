//! Basket lines stored on the user.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{BookId, GroupDiscountId};

/// Copies of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketItem {
    pub book_id: BookId,
    pub count: i64,
}

/// Complete sets of one group discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketGroupDiscount {
    pub group_discount_id: GroupDiscountId,
    pub count: i64,
}

/// A user's basket.
///
/// Flattened into the user document as `basketItems` and
/// `basketGroupDiscounts`. Every line has a positive count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    #[serde(rename = "basketItems", default)]
    pub items: Vec<BasketItem>,
    #[serde(rename = "basketGroupDiscounts", default)]
    pub group_discounts: Vec<BasketGroupDiscount>,
}

/// What reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Books dropped because they are gone or out of stock.
    pub removed_books: Vec<BookId>,
    /// Books whose count was lowered to the stock, with the new count.
    pub clamped_books: Vec<(BookId, i64)>,
    pub removed_group_discounts: Vec<GroupDiscountId>,
    pub clamped_group_discounts: Vec<(GroupDiscountId, i64)>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.removed_books.is_empty()
            && self.clamped_books.is_empty()
            && self.removed_group_discounts.is_empty()
            && self.clamped_group_discounts.is_empty()
    }
}

impl Basket {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.group_discounts.is_empty()
    }

    /// Copies of a book as a loose line.
    pub fn book_count(&self, book_id: &BookId) -> i64 {
        self.items
            .iter()
            .find(|i| &i.book_id == book_id)
            .map_or(0, |i| i.count)
    }

    pub fn group_discount_count(&self, id: &GroupDiscountId) -> i64 {
        self.group_discounts
            .iter()
            .find(|g| &g.group_discount_id == id)
            .map_or(0, |g| g.count)
    }

    /// Add copies of a book, merging with an existing line.
    ///
    /// Returns the new line count, capped at `max`.
    pub fn add_book(
        &mut self,
        book_id: &BookId,
        count: i64,
        max: i64,
    ) -> Result<i64, CommerceError> {
        if count <= 0 {
            return Err(CommerceError::BadData(format!(
                "count must be positive, got {}",
                count
            )));
        }
        let next = self.book_count(book_id).saturating_add(count).min(max);
        Ok(self.set_book_count(book_id, next, max))
    }

    /// Set a book's count. Zero or less removes the line.
    pub fn set_book_count(&mut self, book_id: &BookId, count: i64, max: i64) -> i64 {
        if count <= 0 {
            self.remove_book(book_id);
            return 0;
        }
        let count = count.min(max);
        match self.items.iter_mut().find(|i| &i.book_id == book_id) {
            Some(item) => item.count = count,
            None => self.items.push(BasketItem {
                book_id: book_id.clone(),
                count,
            }),
        }
        count
    }

    pub fn remove_book(&mut self, book_id: &BookId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.book_id != book_id);
        self.items.len() != before
    }

    /// Add sets of a group discount, merging with an existing line.
    pub fn add_group_discount(
        &mut self,
        id: &GroupDiscountId,
        count: i64,
        max: i64,
    ) -> Result<i64, CommerceError> {
        if count <= 0 {
            return Err(CommerceError::BadData(format!(
                "count must be positive, got {}",
                count
            )));
        }
        let next = self.group_discount_count(id).saturating_add(count).min(max);
        Ok(self.set_group_discount_count(id, next, max))
    }

    /// Set a group discount's count. Zero or less removes the line.
    pub fn set_group_discount_count(&mut self, id: &GroupDiscountId, count: i64, max: i64) -> i64 {
        if count <= 0 {
            self.remove_group_discount(id);
            return 0;
        }
        let count = count.min(max);
        match self
            .group_discounts
            .iter_mut()
            .find(|g| &g.group_discount_id == id)
        {
            Some(line) => line.count = count,
            None => self.group_discounts.push(BasketGroupDiscount {
                group_discount_id: id.clone(),
                count,
            }),
        }
        count
    }

    pub fn remove_group_discount(&mut self, id: &GroupDiscountId) -> bool {
        let before = self.group_discounts.len();
        self.group_discounts.retain(|g| &g.group_discount_id != id);
        self.group_discounts.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.group_discounts.clear();
    }

    /// Merge another basket into this one, summing counts per line.
    ///
    /// Non-positive incoming lines are ignored; sums are capped at `max`.
    pub fn merge(&mut self, other: &Basket, max: i64) {
        for item in other.items.iter().filter(|i| i.count > 0) {
            let next = self.book_count(&item.book_id).saturating_add(item.count);
            self.set_book_count(&item.book_id, next, max);
        }
        for line in other.group_discounts.iter().filter(|g| g.count > 0) {
            let next = self
                .group_discount_count(&line.group_discount_id)
                .saturating_add(line.count);
            self.set_group_discount_count(&line.group_discount_id, next, max);
        }
    }

    /// Drop a book's loose line. Returns whether anything changed.
    pub fn forget_book(&mut self, book_id: &BookId) -> bool {
        self.remove_book(book_id)
    }

    /// Bring the basket in line with the catalog.
    ///
    /// `stock` maps every existing book to its stock; `bundles` maps every
    /// existing group discount to its books. Lines pointing at missing or
    /// out-of-stock entries are dropped, counts above stock are clamped. A
    /// group discount's stock is that of its scarcest book.
    pub fn reconcile(
        &mut self,
        stock: &HashMap<BookId, i64>,
        bundles: &HashMap<GroupDiscountId, Vec<BookId>>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        self.items.retain_mut(|item| match stock.get(&item.book_id) {
            Some(&available) if available > 0 => {
                if item.count > available {
                    item.count = available;
                    report.clamped_books.push((item.book_id.clone(), available));
                }
                true
            }
            _ => {
                report.removed_books.push(item.book_id.clone());
                false
            }
        });

        self.group_discounts.retain_mut(|line| {
            let available = bundles.get(&line.group_discount_id).and_then(|books| {
                books
                    .iter()
                    .map(|b| stock.get(b).copied())
                    .collect::<Option<Vec<i64>>>()
                    .and_then(|counts| counts.into_iter().min())
            });
            match available {
                Some(available) if available > 0 => {
                    if line.count > available {
                        line.count = available;
                        report
                            .clamped_group_discounts
                            .push((line.group_discount_id.clone(), available));
                    }
                    true
                }
                _ => {
                    report
                        .removed_group_discounts
                        .push(line.group_discount_id.clone());
                    false
                }
            }
        });

        report
    }
}
