//! Order detail view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Order, OrderBook, OrderGroupDiscount, OrderStatus, ShippingDetails, StatusColors};
use crate::ids::{BookId, DeliveryId, GroupDiscountId, OrderId, UserId};
use crate::money::Money;
use crate::reference::Delivery;

/// An order line with prices rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub book: BookId,
    pub name: String,
    pub count: i64,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    /// `price * count` after the line discount.
    pub total: String,
}

impl OrderLineView {
    fn loose(line: &OrderBook) -> Self {
        let total = line
            .price
            .saturating_multiply(line.count)
            .discounted(line.discount);
        Self::render(line, line.count, line.discount, total)
    }

    /// A book inside `sets` ordered sets. Sets are priced as a whole, so the
    /// line carries base prices and no discount of its own.
    fn in_set(line: &OrderBook, sets: i64) -> Self {
        let count = line.count.saturating_mul(sets);
        Self::render(line, count, None, line.price.saturating_multiply(count))
    }

    fn render(line: &OrderBook, count: i64, discount: Option<f64>, total: Money) -> Self {
        Self {
            book: line.book.clone(),
            name: line.name.clone(),
            count,
            price: line.price.display_amount(),
            discount: discount.filter(|d| *d > 0.0),
            total: total.display_amount(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGroupDiscountView {
    pub group_discount: GroupDiscountId,
    pub books: Vec<OrderLineView>,
    pub count: i64,
    pub discount: f64,
    /// Base prices of all sets.
    pub total: String,
    /// What the sets cost; this is the amount counted in the order total.
    pub total_with_discount: String,
}

impl OrderGroupDiscountView {
    fn new(bundle: &OrderGroupDiscount) -> Self {
        let set_price = bundle.books.iter().fold(0i64, |acc, line| {
            acc.saturating_add(line.price.amount_cents.saturating_mul(line.count))
        });
        let currency = bundle.set_price_with_discount.currency;
        Self {
            group_discount: bundle.group_discount.clone(),
            books: bundle
                .books
                .iter()
                .map(|line| OrderLineView::in_set(line, bundle.count))
                .collect(),
            count: bundle.count,
            discount: bundle.discount,
            total: Money::new(set_price.saturating_mul(bundle.count), currency).display_amount(),
            total_with_discount: bundle
                .set_price_with_discount
                .saturating_multiply(bundle.count)
                .display_amount(),
        }
    }
}

/// An order as shown in the back office and the customer's order history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub order_number: i64,
    pub user: UserId,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub status_colors: StatusColors,
    pub is_confirmed: bool,
    pub is_canceled: bool,
    pub is_sent: bool,
    pub is_done: bool,
    pub is_paid: bool,
    pub is_partly_paid: bool,
    pub shipping: ShippingDetails,
    pub delivery: DeliveryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_name: Option<String>,
    pub is_self_pickup: bool,
    /// Absent for self-pickup orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    /// Carrier tracking link; absent for self-pickup orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_link: Option<String>,
    pub books: Vec<OrderLineView>,
    pub group_discounts: Vec<OrderGroupDiscountView>,
    pub final_sum: String,
    pub final_sum_with_discounts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_comment: Option<String>,
    /// RFC 3339.
    pub created_at: String,
}

impl OrderView {
    /// Build the view. `delivery` is the order's delivery method if it still exists.
    pub fn new(order: &Order, delivery: Option<&Delivery>, self_pickup: bool) -> Self {
        let tracking_number = if self_pickup {
            None
        } else {
            order.tracking_number.clone()
        };
        let tracking_link = match (&tracking_number, delivery) {
            (Some(number), Some(delivery)) => delivery.tracking_link(number),
            _ => None,
        };

        Self {
            id: order.id.clone(),
            order_number: order.order_number,
            user: order.user.clone(),
            status: order.status,
            status_label: order.status.display_name(),
            status_colors: order.status.colors(),
            is_confirmed: order.status.is_confirmed(),
            is_canceled: order.status == OrderStatus::Canceled,
            is_sent: order.status.is_sent(),
            is_done: order.status == OrderStatus::Done,
            is_paid: order.is_paid,
            is_partly_paid: order.is_partly_paid,
            shipping: order.shipping.clone(),
            delivery: order.delivery.clone(),
            delivery_name: delivery.map(|d| d.name.clone()),
            is_self_pickup: self_pickup,
            tracking_number,
            tracking_link,
            books: order.books.iter().map(OrderLineView::loose).collect(),
            group_discounts: order
                .group_discounts
                .iter()
                .map(OrderGroupDiscountView::new)
                .collect(),
            final_sum: order.totals.final_sum.display_amount(),
            final_sum_with_discounts: order.totals.final_sum_with_discounts.display_amount(),
            comment: order.comment.clone(),
            admin_comment: order.admin_comment.clone(),
            created_at: render_timestamp(order.created_at),
        }
    }
}

fn render_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_render_timestamp() {
        assert_eq!(render_timestamp(0), "1970-01-01T00:00:00+00:00");
    }

    fn line(name: &str, cents: i64, discount: Option<f64>) -> OrderBook {
        OrderBook {
            book: BookId::new(name),
            name: name.to_string(),
            count: 1,
            price: Money::new(cents, Currency::UAH),
            discount,
        }
    }

    #[test]
    fn test_set_lines_show_base_prices() {
        let bundle = OrderGroupDiscount {
            group_discount: GroupDiscountId::new("g1"),
            books: vec![line("a", 10000, Some(50.0)), line("b", 10000, None)],
            count: 2,
            discount: 10.0,
            set_price_with_discount: Money::new(18000, Currency::UAH),
        };

        let view = OrderGroupDiscountView::new(&bundle);
        assert_eq!(view.books[0].count, 2);
        assert_eq!(view.books[0].discount, None);
        assert_eq!(view.books[0].total, "200.00");
        assert_eq!(view.total, "400.00");
        assert_eq!(view.total_with_discount, "360.00");
    }

    #[test]
    fn test_loose_line_keeps_its_discount() {
        let mut book = line("a", 10000, Some(25.0));
        book.count = 3;
        let view = OrderLineView::loose(&book);
        assert_eq!(view.total, "225.00");
        assert_eq!(view.discount, Some(25.0));
    }

    #[test]
    fn test_overflowing_line_total_saturates() {
        let mut book = line("a", i64::MAX / 2, None);
        book.count = 3;
        let view = OrderLineView::loose(&book);
        assert_eq!(view.total, Money::new(i64::MAX, Currency::UAH).display_amount());
        assert_ne!(view.total, view.price);
    }
}
