//! Basket pricing.
//!
//! A pure computation over priced basket lines: no database access, so the
//! same code prices a stored basket, a quote and an order snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{BookId, GroupDiscountId};
use crate::money::{Currency, Money};

/// Which discount applies to a book unit that is part of a group set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPrecedence {
    /// Group percentage off the base prices; the book's own discount is ignored.
    #[default]
    GroupOnBasePrice,
    /// Group percentage off the already discounted prices.
    Stacked,
    /// Whichever of the two gives the lower set price.
    BestOf,
}

impl DiscountPrecedence {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountPrecedence::GroupOnBasePrice => "group_on_base_price",
            DiscountPrecedence::Stacked => "stacked",
            DiscountPrecedence::BestOf => "best_of",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "group_on_base_price" => Some(DiscountPrecedence::GroupOnBasePrice),
            "stacked" => Some(DiscountPrecedence::Stacked),
            "best_of" => Some(DiscountPrecedence::BestOf),
            _ => None,
        }
    }
}

/// A book with its current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedBook {
    pub book_id: BookId,
    pub name: String,
    pub price: Money,
    pub discount: Option<f64>,
}

impl PricedBook {
    fn discounted(&self) -> Money {
        self.price.discounted(self.discount)
    }
}

/// Loose copies of one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookLine {
    pub book: PricedBook,
    pub count: i64,
}

/// Explicit sets of one group discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleLine {
    pub group_discount_id: GroupDiscountId,
    pub discount: f64,
    /// One copy of each book in the set.
    pub books: Vec<PricedBook>,
    pub count: i64,
}

/// A group discount that may match loose book lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOffer {
    pub group_discount_id: GroupDiscountId,
    pub books: Vec<BookId>,
    pub discount: f64,
}

/// Pricing of one loose book line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePricing {
    pub book_id: BookId,
    pub name: String,
    pub count: i64,
    pub unit_price: Money,
    pub discount: Option<f64>,
    /// `price * count`.
    pub line_total: Money,
    /// `price * count` reduced by the book's own discount.
    pub line_discounted: Money,
    /// Units of this line consumed by matched group sets.
    pub grouped_count: i64,
}

/// Pricing of an explicit bundle line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlePricing {
    pub group_discount_id: GroupDiscountId,
    pub discount: f64,
    pub count: i64,
    /// Sum of the set's base prices.
    pub set_price: Money,
    /// Price of one set after discounts.
    pub set_price_with_discount: Money,
    pub total: Money,
    pub total_with_discount: Money,
}

/// A group discount matched among loose book lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMatch {
    pub group_discount_id: GroupDiscountId,
    pub discount: f64,
    pub books: Vec<BookId>,
    /// Complete sets matched.
    pub count: i64,
    pub total: Money,
    pub total_with_discount: Money,
}

/// Full pricing breakdown of a basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketPricing {
    /// Sum of all base prices.
    pub final_sum: Money,
    /// What the customer pays.
    pub final_sum_with_discounts: Money,
    pub lines: Vec<LinePricing>,
    pub bundles: Vec<BundlePricing>,
    pub matched: Vec<GroupMatch>,
}

impl BasketPricing {
    pub fn savings(&self) -> Money {
        Money::new(
            self.final_sum.amount_cents - self.final_sum_with_discounts.amount_cents,
            self.final_sum.currency,
        )
    }

    pub fn has_discounts(&self) -> bool {
        self.final_sum != self.final_sum_with_discounts
    }
}

/// Price a basket.
///
/// Offers are matched greedily among loose lines in descending discount
/// order (ties by id): an offer applies to `min(count)` complete sets of its
/// books and each unit joins at most one set. An offer whose set would cost
/// more than the same books at their own discounts is skipped. Units left
/// over get their own discount. Percentage reductions round half away from
/// zero.
pub fn price_basket(
    lines: &[BookLine],
    bundles: &[BundleLine],
    offers: &[GroupOffer],
    precedence: DiscountPrecedence,
    currency: Currency,
) -> Result<BasketPricing, CommerceError> {
    let mut final_sum = Money::zero(currency);
    let mut with_discounts = Money::zero(currency);

    let mut remaining: HashMap<&BookId, i64> = HashMap::new();
    let mut by_id: HashMap<&BookId, &PricedBook> = HashMap::new();
    for line in lines.iter().filter(|l| l.count > 0) {
        *remaining.entry(&line.book.book_id).or_insert(0) += line.count;
        by_id.insert(&line.book.book_id, &line.book);
    }

    let mut ordered: Vec<&GroupOffer> = offers.iter().collect();
    ordered.sort_by(|a, b| {
        b.discount
            .total_cmp(&a.discount)
            .then_with(|| a.group_discount_id.cmp(&b.group_discount_id))
    });

    let mut matched = Vec::new();
    for offer in ordered {
        if offer.books.is_empty() {
            continue;
        }
        let sets = offer
            .books
            .iter()
            .map(|b| remaining.get(b).copied().unwrap_or(0))
            .min()
            .unwrap_or(0);
        if sets <= 0 {
            continue;
        }

        let set_books: Vec<&PricedBook> = offer
            .books
            .iter()
            .filter_map(|book_id| by_id.get(book_id).copied())
            .collect();
        let (set_price, set_with) = price_set(&set_books, offer.discount, precedence, currency)?;
        // The books stay loose when their own discounts already beat the set.
        let loose = sum(set_books.iter().map(|b| b.discounted()), currency)?;
        if set_with.amount_cents > loose.amount_cents {
            continue;
        }
        for book_id in &offer.books {
            if let Some(count) = remaining.get_mut(book_id) {
                *count -= sets;
            }
        }

        let total = multiply(&set_price, sets)?;
        let total_with_discount = multiply(&set_with, sets)?;
        with_discounts = add(&with_discounts, &total_with_discount)?;
        matched.push(GroupMatch {
            group_discount_id: offer.group_discount_id.clone(),
            discount: offer.discount,
            books: offer.books.clone(),
            count: sets,
            total,
            total_with_discount,
        });
    }

    let mut line_pricing = Vec::with_capacity(lines.len());
    for line in lines.iter().filter(|l| l.count > 0) {
        let book = &line.book;
        let line_total = multiply(&book.price, line.count)?;
        let line_discounted = line_total.discounted(book.discount);
        final_sum = add(&final_sum, &line_total)?;

        // Loose units left after matching. Duplicate lines for one book
        // share the remaining pool, so take from it line by line.
        let left = remaining.get_mut(&book.book_id).map_or(0, |r| {
            let take = (*r).min(line.count).max(0);
            *r -= take;
            take
        });
        let loose = multiply(&book.price, left)?.discounted(book.discount);
        with_discounts = add(&with_discounts, &loose)?;

        line_pricing.push(LinePricing {
            book_id: book.book_id.clone(),
            name: book.name.clone(),
            count: line.count,
            unit_price: book.price,
            discount: book.discount,
            line_total,
            line_discounted,
            grouped_count: line.count - left,
        });
    }

    let mut bundle_pricing = Vec::with_capacity(bundles.len());
    for bundle in bundles.iter().filter(|b| b.count > 0) {
        let books: Vec<&PricedBook> = bundle.books.iter().collect();
        let (set_price, set_with) = price_set(&books, bundle.discount, precedence, currency)?;
        let total = multiply(&set_price, bundle.count)?;
        let total_with_discount = multiply(&set_with, bundle.count)?;
        final_sum = add(&final_sum, &total)?;
        with_discounts = add(&with_discounts, &total_with_discount)?;
        bundle_pricing.push(BundlePricing {
            group_discount_id: bundle.group_discount_id.clone(),
            discount: bundle.discount,
            count: bundle.count,
            set_price,
            set_price_with_discount: set_with,
            total,
            total_with_discount,
        });
    }

    Ok(BasketPricing {
        final_sum,
        final_sum_with_discounts: with_discounts,
        lines: line_pricing,
        bundles: bundle_pricing,
        matched,
    })
}

/// Base price and discounted price of one set.
fn price_set(
    books: &[&PricedBook],
    discount: f64,
    precedence: DiscountPrecedence,
    currency: Currency,
) -> Result<(Money, Money), CommerceError> {
    let base = sum(books.iter().map(|b| b.price), currency)?;
    let group_on_base = base.discounted(Some(discount));
    let with = match precedence {
        DiscountPrecedence::GroupOnBasePrice => group_on_base,
        DiscountPrecedence::Stacked => {
            sum(books.iter().map(|b| b.discounted()), currency)?.discounted(Some(discount))
        }
        DiscountPrecedence::BestOf => {
            let own = sum(books.iter().map(|b| b.discounted()), currency)?;
            if own.amount_cents < group_on_base.amount_cents {
                own
            } else {
                group_on_base
            }
        }
    };
    Ok((base, with))
}

fn sum(prices: impl Iterator<Item = Money>, currency: Currency) -> Result<Money, CommerceError> {
    prices.fold(Ok(Money::zero(currency)), |acc, m| add(&acc?, &m))
}

fn add(a: &Money, b: &Money) -> Result<Money, CommerceError> {
    if a.currency != b.currency {
        return Err(CommerceError::CurrencyMismatch {
            expected: a.currency.to_string(),
            got: b.currency.to_string(),
        });
    }
    a.try_add(b).ok_or(CommerceError::Overflow)
}

fn multiply(m: &Money, count: i64) -> Result<Money, CommerceError> {
    m.try_multiply(count).ok_or(CommerceError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, cents: i64, discount: Option<f64>) -> PricedBook {
        PricedBook {
            book_id: BookId::new(id),
            name: id.to_uppercase(),
            price: Money::new(cents, Currency::UAH),
            discount,
        }
    }

    fn line(id: &str, cents: i64, discount: Option<f64>, count: i64) -> BookLine {
        BookLine {
            book: book(id, cents, discount),
            count,
        }
    }

    fn offer(id: &str, books: &[&str], discount: f64) -> GroupOffer {
        GroupOffer {
            group_discount_id: GroupDiscountId::new(id),
            books: books.iter().map(|b| BookId::new(*b)).collect(),
            discount,
        }
    }

    fn price(lines: &[BookLine], offers: &[GroupOffer]) -> BasketPricing {
        price_basket(
            lines,
            &[],
            offers,
            DiscountPrecedence::default(),
            Currency::UAH,
        )
        .unwrap()
    }

    #[test]
    fn test_no_discounts_sums_match() {
        let pricing = price(
            &[line("a", 12000, None, 2), line("b", 9950, Some(0.0), 1)],
            &[],
        );
        assert_eq!(pricing.final_sum.amount_cents, 33950);
        assert_eq!(pricing.final_sum, pricing.final_sum_with_discounts);
        assert!(!pricing.has_discounts());
    }

    #[test]
    fn test_per_book_discount() {
        let pricing = price(&[line("a", 10000, Some(15.0), 3)], &[]);
        assert_eq!(pricing.final_sum.amount_cents, 30000);
        assert_eq!(pricing.final_sum_with_discounts.amount_cents, 25500);
        assert_eq!(pricing.lines[0].line_discounted.amount_cents, 25500);
        assert_eq!(pricing.savings().amount_cents, 4500);
    }

    #[test]
    fn test_group_match_min_count() {
        // Two complete sets of {a, b}; the third copy of a stays loose.
        let pricing = price(
            &[line("a", 10000, None, 3), line("b", 5000, None, 2)],
            &[offer("g", &["a", "b"], 10.0)],
        );
        assert_eq!(pricing.matched.len(), 1);
        assert_eq!(pricing.matched[0].count, 2);
        assert_eq!(pricing.final_sum.amount_cents, 40000);
        // 2 * (15000 - 1500) + 10000
        assert_eq!(pricing.final_sum_with_discounts.amount_cents, 37000);
        assert_eq!(pricing.lines[0].grouped_count, 2);
        assert_eq!(pricing.lines[1].grouped_count, 2);
    }

    #[test]
    fn test_incomplete_set_does_not_match() {
        let pricing = price(
            &[line("a", 10000, None, 1)],
            &[offer("g", &["a", "b"], 50.0)],
        );
        assert!(pricing.matched.is_empty());
        assert_eq!(pricing.final_sum, pricing.final_sum_with_discounts);
    }

    #[test]
    fn test_units_join_one_match_highest_first() {
        // a is wanted by both offers; the 20% offer wins it.
        let pricing = price(
            &[
                line("a", 10000, None, 1),
                line("b", 10000, None, 1),
                line("c", 10000, None, 1),
            ],
            &[offer("g-low", &["a", "b"], 10.0), offer("g-high", &["a", "c"], 20.0)],
        );
        assert_eq!(pricing.matched.len(), 1);
        assert_eq!(pricing.matched[0].group_discount_id.as_str(), "g-high");
        assert_eq!(pricing.final_sum_with_discounts.amount_cents, 16000 + 10000);
    }

    #[test]
    fn test_equal_discounts_tie_by_id() {
        let pricing = price(
            &[line("a", 10000, None, 1), line("b", 10000, None, 1), line("c", 10000, None, 1)],
            &[offer("g2", &["a", "c"], 10.0), offer("g1", &["a", "b"], 10.0)],
        );
        assert_eq!(pricing.matched[0].group_discount_id.as_str(), "g1");
    }

    #[test]
    fn test_precedence_policies() {
        let lines = [line("a", 10000, Some(5.0), 1), line("b", 10000, None, 1)];
        let offers = [offer("g", &["a", "b"], 10.0)];
        let run = |precedence| {
            price_basket(&lines, &[], &offers, precedence, Currency::UAH)
                .unwrap()
                .final_sum_with_discounts
                .amount_cents
        };
        // Group on base: 20000 - 10%.
        assert_eq!(run(DiscountPrecedence::GroupOnBasePrice), 18000);
        // Stacked: (9500 + 10000) - 10%.
        assert_eq!(run(DiscountPrecedence::Stacked), 17550);
        // Best of 18000 and 19500.
        assert_eq!(run(DiscountPrecedence::BestOf), 18000);
    }

    #[test]
    fn test_offer_dearer_than_own_discounts_is_skipped() {
        // The set would cost 18000; the books alone cost 5000 + 10000.
        let pricing = price(
            &[line("a", 10000, Some(50.0), 1), line("b", 10000, None, 1)],
            &[offer("g", &["a", "b"], 10.0)],
        );
        assert!(pricing.matched.is_empty());
        assert_eq!(pricing.final_sum_with_discounts.amount_cents, 15000);
        assert_eq!(pricing.lines[0].grouped_count, 0);

        // Adding the second book never raises the price of the first.
        let alone = price(&[line("a", 10000, Some(50.0), 1)], &[offer("g", &["a", "b"], 10.0)]);
        assert_eq!(
            pricing.final_sum_with_discounts.amount_cents
                - alone.final_sum_with_discounts.amount_cents,
            10000
        );
    }

    #[test]
    fn test_explicit_bundle_line() {
        let bundle = BundleLine {
            group_discount_id: GroupDiscountId::new("g"),
            discount: 25.0,
            books: vec![book("a", 10000, None), book("b", 6000, None)],
            count: 2,
        };
        let pricing = price_basket(
            &[line("c", 1000, None, 1)],
            &[bundle],
            &[],
            DiscountPrecedence::GroupOnBasePrice,
            Currency::UAH,
        )
        .unwrap();
        assert_eq!(pricing.final_sum.amount_cents, 33000);
        assert_eq!(pricing.final_sum_with_discounts.amount_cents, 24000 + 1000);
        assert_eq!(pricing.bundles[0].set_price_with_discount.amount_cents, 12000);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 999 * 15% = 149.85 -> 150 off.
        let pricing = price(&[line("a", 999, Some(15.0), 1)], &[]);
        assert_eq!(pricing.final_sum_with_discounts.amount_cents, 849);
    }

    #[test]
    fn test_currency_mismatch() {
        let mut eur = line("a", 1000, None, 1);
        eur.book.price = Money::new(1000, Currency::EUR);
        let err = price_basket(&[eur], &[], &[], DiscountPrecedence::default(), Currency::UAH)
            .unwrap_err();
        assert!(matches!(err, CommerceError::CurrencyMismatch { .. }));
    }

    #[test]
    fn test_precedence_serde() {
        let json = serde_json::to_string(&DiscountPrecedence::BestOf).unwrap();
        assert_eq!(json, "\"best_of\"");
        assert_eq!(
            DiscountPrecedence::from_str("stacked"),
            Some(DiscountPrecedence::Stacked)
        );
    }
}
