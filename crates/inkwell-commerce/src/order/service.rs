//! Order creation and back-office operations.

use std::collections::HashMap;

use inkwell_db::{Db, Filter};
use serde::{Deserialize, Serialize};

use super::{
    Order, OrderBook, OrderGroupDiscount, OrderStatus, OrderTotals, OrderView, ShippingDetails,
};
use crate::basket::BasketService;
use crate::catalog::{Book, CatalogService};
use crate::error::CommerceError;
use crate::group_discount::GroupDiscount;
use crate::ids::{BookId, DeliveryId, OrderId, UserId};
use crate::page::{Page, PageSettings};
use crate::reference::Delivery;
use crate::settings::ShopSettings;
use crate::user::User;

const ORDER_SEQUENCE: &str = "orders";

const SORTABLE: &[(&str, &str)] = &[
    ("orderNumber", "orderNumber"),
    ("createdAt", "createdAt"),
    ("status", "status"),
    ("total", "totals.finalSumWithDiscounts.amountCents"),
];

/// Checkout payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub shipping: ShippingDetails,
    pub delivery: DeliveryId,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Back-office order list query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub order_number: Option<i64>,
    #[serde(flatten)]
    pub page: PageSettings,
}

/// Order operations.
pub struct OrderService<'a> {
    db: &'a Db,
    settings: &'a ShopSettings,
}

impl<'a> OrderService<'a> {
    pub fn new(db: &'a Db, settings: &'a ShopSettings) -> Self {
        Self { db, settings }
    }

    /// Turn the user's basket into an order.
    ///
    /// The basket is reconciled first; prices are snapshotted, stock is
    /// taken and the basket is cleared. Checkouts run one at a time, so a
    /// failed one leaves stock and the order number sequence untouched.
    pub fn create_order(
        &self,
        user_id: &str,
        input: CreateOrderInput,
    ) -> Result<Order, CommerceError> {
        let _guard = self.db.exclusive()?;
        let mut user = self
            .db
            .get::<User>(user_id)?
            .ok_or_else(|| CommerceError::not_found("User", user_id))?;
        if self.db.get::<Delivery>(input.delivery.as_str())?.is_none() {
            return Err(CommerceError::not_found("Delivery", input.delivery.as_str()));
        }
        input
            .shipping
            .validate(self.settings.is_self_pickup(&input.delivery))?;

        let baskets = BasketService::new(self.db, self.settings);
        let report = baskets.reconcile_basket(&mut user.basket)?;
        if !report.is_clean() {
            tracing::info!(user = user_id, ?report, "basket reconciled at checkout");
        }
        if user.basket.is_empty() {
            // Keep the reconciled basket so the client sees why.
            self.db.replace(&user)?;
            return Err(CommerceError::BadData("basket is empty".into()));
        }

        let pricing = baskets.quote(&user.basket)?;
        let books: Vec<OrderBook> = pricing
            .lines
            .iter()
            .map(|line| OrderBook {
                book: line.book_id.clone(),
                name: line.name.clone(),
                count: line.count,
                price: line.unit_price,
                discount: line.discount,
            })
            .collect();

        let mut group_discounts = Vec::with_capacity(pricing.bundles.len());
        for bundle in &pricing.bundles {
            let Some(group) = self
                .db
                .get::<GroupDiscount>(bundle.group_discount_id.as_str())?
            else {
                continue;
            };
            let mut set = Vec::with_capacity(group.books.len());
            for book in CatalogService::new(self.db).books(&group.books)? {
                set.push(OrderBook {
                    book: book.id,
                    name: book.name,
                    count: 1,
                    price: book.price,
                    discount: book.discount,
                });
            }
            group_discounts.push(OrderGroupDiscount {
                group_discount: group.id,
                books: set,
                count: bundle.count,
                discount: bundle.discount,
                set_price_with_discount: bundle.set_price_with_discount,
            });
        }

        let now = crate::current_timestamp();
        let mut order = Order {
            id: OrderId::generate(),
            order_number: 0,
            user: user.id.clone(),
            shipping: input.shipping,
            delivery: input.delivery,
            tracking_number: None,
            status: OrderStatus::Created,
            is_paid: false,
            is_partly_paid: false,
            comment: input.comment.filter(|c| !c.trim().is_empty()),
            admin_comment: None,
            books,
            group_discounts,
            totals: OrderTotals {
                final_sum: pricing.final_sum,
                final_sum_with_discounts: pricing.final_sum_with_discounts,
            },
            created_at: now,
            updated_at: now,
        };

        let demand = order.book_quantities();
        self.check_stock(&demand)?;
        self.take_stock(&demand)?;
        order.order_number = self.db.next_sequence(ORDER_SEQUENCE)?;

        if let Err(err) = self.db.insert(&order) {
            self.return_stock(&demand)?;
            return Err(err.into());
        }
        user.basket.clear();
        self.db.replace(&user)?;

        tracing::info!(
            order = order.order_number,
            user = user_id,
            total = %order.totals.final_sum_with_discounts,
            "created order"
        );
        Ok(order)
    }

    pub fn get(&self, id: &str) -> Result<Order, CommerceError> {
        self.db
            .get::<Order>(id)?
            .ok_or_else(|| CommerceError::not_found("Order", id))
    }

    pub fn get_by_number(&self, number: i64) -> Result<Order, CommerceError> {
        self.db
            .find_one::<Order>(&Filter::eq("orderNumber", number))?
            .ok_or_else(|| CommerceError::not_found("Order", number.to_string()))
    }

    pub fn list(&self, query: &OrderQuery) -> Result<Page<Order>, CommerceError> {
        let mut filter = Filter::All;
        if let Some(status) = query.status {
            filter = filter.and(Filter::eq("status", status.as_str()));
        }
        if let Some(user) = &query.user {
            filter = filter.and(Filter::eq("user", user));
        }
        if let Some(number) = query.order_number {
            filter = filter.and(Filter::eq("orderNumber", number));
        }
        let options = query.page.find_options(SORTABLE, "orderNumber")?;
        let total = self.db.count::<Order>(&filter)?;
        let items = self.db.find::<Order>(&filter, &options)?;
        Ok(Page::new(items, total, &query.page))
    }

    /// Move an order to another status. Canceling returns the stock.
    pub fn transition(&self, id: &str, next: OrderStatus) -> Result<Order, CommerceError> {
        let _guard = self.db.exclusive()?;
        let mut order = self.get(id)?;
        if !order.status.can_transition_to(next) {
            return Err(CommerceError::InvalidTransition {
                from: order.status.to_string(),
                to: next.to_string(),
            });
        }

        if next == OrderStatus::Canceled {
            let catalog = CatalogService::new(self.db);
            for (book_id, count) in order.book_quantities() {
                // A deleted book has nothing to restock.
                if self.db.get::<Book>(book_id.as_str())?.is_some() {
                    catalog.apply_stock_delta(book_id.as_str(), count)?;
                }
            }
        }

        let from = order.status;
        order.status = next;
        order.touch();
        self.db.replace(&order)?;
        tracing::info!(order = order.order_number, %from, to = %next, "order status changed");
        Ok(order)
    }

    pub fn cancel(&self, id: &str) -> Result<Order, CommerceError> {
        self.transition(id, OrderStatus::Canceled)
    }

    /// Set payment flags. An order cannot be both paid and partly paid.
    pub fn set_payment(
        &self,
        id: &str,
        is_paid: bool,
        is_partly_paid: bool,
    ) -> Result<Order, CommerceError> {
        if is_paid && is_partly_paid {
            return Err(CommerceError::InvalidData(
                "an order cannot be both paid and partly paid".into(),
            ));
        }
        let mut order = self.get(id)?;
        order.is_paid = is_paid;
        order.is_partly_paid = is_partly_paid;
        order.touch();
        self.db.replace(&order)?;
        Ok(order)
    }

    /// Set or clear the tracking number. Self-pickup orders have none.
    pub fn set_tracking_number(
        &self,
        id: &str,
        tracking_number: Option<String>,
    ) -> Result<Order, CommerceError> {
        let mut order = self.get(id)?;
        let tracking_number = tracking_number
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if tracking_number.is_some() && self.settings.is_self_pickup(&order.delivery) {
            return Err(CommerceError::BadData(
                "self-pickup orders have no tracking number".into(),
            ));
        }
        order.tracking_number = tracking_number;
        order.touch();
        self.db.replace(&order)?;
        Ok(order)
    }

    /// Replace shipping details while the order is not yet on its way.
    pub fn update_shipping(
        &self,
        id: &str,
        shipping: ShippingDetails,
    ) -> Result<Order, CommerceError> {
        let mut order = self.get(id)?;
        if !order.status.is_editable() {
            return Err(CommerceError::InvalidData(format!(
                "shipping of a {} order cannot change",
                order.status
            )));
        }
        shipping.validate(self.settings.is_self_pickup(&order.delivery))?;
        order.shipping = shipping;
        order.touch();
        self.db.replace(&order)?;
        Ok(order)
    }

    pub fn set_admin_comment(
        &self,
        id: &str,
        comment: Option<String>,
    ) -> Result<Order, CommerceError> {
        let mut order = self.get(id)?;
        order.admin_comment = comment.filter(|c| !c.trim().is_empty());
        order.touch();
        self.db.replace(&order)?;
        Ok(order)
    }

    pub fn view(&self, order: &Order) -> Result<OrderView, CommerceError> {
        let delivery = self.db.get::<Delivery>(order.delivery.as_str())?;
        Ok(OrderView::new(
            order,
            delivery.as_ref(),
            self.settings.is_self_pickup(&order.delivery),
        ))
    }

    /// Decrement stock for every line, or for none of them.
    fn take_stock(&self, demand: &[(BookId, i64)]) -> Result<(), CommerceError> {
        let catalog = CatalogService::new(self.db);
        for (taken, (book_id, count)) in demand.iter().enumerate() {
            if let Err(err) = catalog.apply_stock_delta(book_id.as_str(), -count) {
                self.return_stock(&demand[..taken])?;
                return Err(err);
            }
        }
        Ok(())
    }

    fn return_stock(&self, demand: &[(BookId, i64)]) -> Result<(), CommerceError> {
        let catalog = CatalogService::new(self.db);
        for (book_id, count) in demand {
            catalog.apply_stock_delta(book_id.as_str(), *count)?;
        }
        Ok(())
    }

    fn check_stock(&self, demand: &[(BookId, i64)]) -> Result<(), CommerceError> {
        let mut stock: HashMap<&BookId, Book> = HashMap::new();
        for (book_id, _) in demand {
            let book = CatalogService::new(self.db).get(book_id.as_str())?;
            stock.insert(book_id, book);
        }
        for (book_id, requested) in demand {
            if let Some(book) = stock.get(book_id) {
                if book.number_in_stock < *requested {
                    return Err(CommerceError::InsufficientStock {
                        name: book.name.clone(),
                        requested: *requested,
                        available: book.number_in_stock,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogService;
    use crate::error::ErrorCode;
    use crate::group_discount::{GroupDiscountInput, GroupDiscountService};
    use crate::order::ShippingAddress;
    use crate::reference::{DeliveryInput, ReferenceService};
    use crate::testing::{seed_book, seed_user, Fixture};

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            first_name: "Olena".to_string(),
            last_name: "Kovalenko".to_string(),
            phone: "+380501234567".to_string(),
            email: "olena@example.com".to_string(),
            address: ShippingAddress {
                city: "Kyiv".to_string(),
                region: "Kyivska".to_string(),
                warehouse: Some("Branch 12".to_string()),
                ..Default::default()
            },
        }
    }

    fn courier(fx: &Fixture) -> Delivery {
        ReferenceService::<Delivery>::new(&fx.db)
            .create(DeliveryInput {
                name: "Nova Poshta".to_string(),
                image_id: None,
                tracking_url: Some("https://novaposhta.ua/tracking/?cargo_number={number}".into()),
            })
            .unwrap()
    }

    fn checkout(delivery: &Delivery) -> CreateOrderInput {
        CreateOrderInput {
            shipping: shipping(),
            delivery: delivery.id.clone(),
            comment: None,
        }
    }

    fn place(fx: &Fixture, delivery: &Delivery) -> Order {
        let user = seed_user(fx, &format!("{}@example.com", uuid::Uuid::new_v4().simple()));
        let book = seed_book(fx, "Kobzar", 25000, 10);
        BasketService::new(&fx.db, &fx.settings)
            .add_book(user.id.as_str(), &book.id, 2)
            .unwrap();
        OrderService::new(&fx.db, &fx.settings)
            .create_order(user.id.as_str(), checkout(delivery))
            .unwrap()
    }

    #[test]
    fn test_create_order_snapshots_and_takes_stock() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let user = seed_user(&fx, "a@example.com");
        let book = seed_book(&fx, "Kobzar", 25000, 5);
        BasketService::new(&fx.db, &fx.settings)
            .add_book(user.id.as_str(), &book.id, 2)
            .unwrap();

        let orders = OrderService::new(&fx.db, &fx.settings);
        let order = orders
            .create_order(user.id.as_str(), checkout(&delivery))
            .unwrap();

        assert_eq!(order.order_number, 1);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.books[0].count, 2);
        assert_eq!(order.totals.final_sum.amount_cents, 50000);

        let catalog = CatalogService::new(&fx.db);
        assert_eq!(catalog.get(book.id.as_str()).unwrap().number_in_stock, 3);
        let user: User = fx.db.get(user.id.as_str()).unwrap().unwrap();
        assert!(user.basket.is_empty());

        // Later price changes do not touch the order.
        let mut input = fx.book_input("Kobzar", 99900, 3);
        input.discount = Some(50.0);
        catalog.update(book.id.as_str(), input).unwrap();
        let stored = orders.get(order.id.as_str()).unwrap();
        assert_eq!(stored.books[0].price.amount_cents, 25000);
        assert_eq!(stored.totals, order.totals);
    }

    #[test]
    fn test_order_numbers_are_sequential() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let numbers: Vec<i64> = (0..3).map(|_| place(&fx, &delivery).order_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_failed_stock_take_returns_what_it_took() {
        let fx = Fixture::new();
        let a = seed_book(&fx, "Kobzar", 25000, 1);
        let b = seed_book(&fx, "Haidamaky", 18000, 0);

        let orders = OrderService::new(&fx.db, &fx.settings);
        let err = orders
            .take_stock(&[(a.id.clone(), 1), (b.id.clone(), 1)])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadData);

        let catalog = CatalogService::new(&fx.db);
        assert_eq!(catalog.get(a.id.as_str()).unwrap().number_in_stock, 1);
        assert_eq!(catalog.get(b.id.as_str()).unwrap().number_in_stock, 0);
    }

    #[test]
    fn test_racing_checkouts_take_all_or_nothing() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let baskets = BasketService::new(&fx.db, &fx.settings);
        let orders = OrderService::new(&fx.db, &fx.settings);
        let catalog = CatalogService::new(&fx.db);

        let rounds = 40;
        for round in 0..rounds {
            let a = seed_book(&fx, &format!("Volume A{round}"), 10000, 1);
            let b = seed_book(&fx, &format!("Volume B{round}"), 10000, 1);
            let first = seed_user(&fx, &format!("first{round}@example.com"));
            let second = seed_user(&fx, &format!("second{round}@example.com"));
            baskets.add_book(first.id.as_str(), &a.id, 1).unwrap();
            baskets.add_book(first.id.as_str(), &b.id, 1).unwrap();
            baskets.add_book(second.id.as_str(), &b.id, 1).unwrap();
            baskets.add_book(second.id.as_str(), &a.id, 1).unwrap();

            let placed = std::thread::scope(|scope| {
                let handles = [&first, &second].map(|user| {
                    let orders = &orders;
                    let delivery = &delivery;
                    scope.spawn(move || {
                        orders
                            .create_order(user.id.as_str(), checkout(delivery))
                            .is_ok()
                    })
                });
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap())
                    .filter(|ok| *ok)
                    .count()
            });

            assert_eq!(placed, 1, "round {round}");
            for book in [&a, &b] {
                assert_eq!(catalog.get(book.id.as_str()).unwrap().number_in_stock, 0);
            }
        }

        let mut numbers: Vec<i64> = fx
            .db
            .all::<Order>()
            .unwrap()
            .into_iter()
            .map(|order| order.order_number)
            .collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=rounds).collect::<Vec<i64>>());
    }

    #[test]
    fn test_empty_basket_is_bad_data() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let user = seed_user(&fx, "a@example.com");
        let err = OrderService::new(&fx.db, &fx.settings)
            .create_order(user.id.as_str(), checkout(&delivery))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadData);
    }

    #[test]
    fn test_unknown_delivery_is_not_found() {
        let fx = Fixture::new();
        let user = seed_user(&fx, "a@example.com");
        let err = OrderService::new(&fx.db, &fx.settings)
            .create_order(
                user.id.as_str(),
                CreateOrderInput {
                    shipping: shipping(),
                    delivery: "teleport".into(),
                    comment: None,
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_bundle_and_loose_demand_checked_together() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let user = seed_user(&fx, "a@example.com");
        let a = seed_book(&fx, "A", 10000, 2);
        let b = seed_book(&fx, "B", 10000, 5);
        let group = GroupDiscountService::new(&fx.db)
            .create(GroupDiscountInput {
                books: vec![a.id.clone(), b.id.clone()],
                discount: 10.0,
            })
            .unwrap();
        let baskets = BasketService::new(&fx.db, &fx.settings);
        baskets.add_book(user.id.as_str(), &a.id, 2).unwrap();
        baskets
            .add_group_discount(user.id.as_str(), &group.id, 1)
            .unwrap();

        let err = OrderService::new(&fx.db, &fx.settings)
            .create_order(user.id.as_str(), checkout(&delivery))
            .unwrap_err();
        assert!(matches!(err, CommerceError::InsufficientStock { .. }));
        assert_eq!(err.code(), ErrorCode::BadData);
        // Nothing was taken.
        let catalog = CatalogService::new(&fx.db);
        assert_eq!(catalog.get(a.id.as_str()).unwrap().number_in_stock, 2);
    }

    #[test]
    fn test_bundle_view_adds_up_to_order_total() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let user = seed_user(&fx, "a@example.com");
        let mut input = fx.book_input("A", 10000, 5);
        input.discount = Some(50.0);
        let a = CatalogService::new(&fx.db).create(input).unwrap();
        let b = seed_book(&fx, "B", 10000, 5);
        let group = GroupDiscountService::new(&fx.db)
            .create(GroupDiscountInput {
                books: vec![a.id.clone(), b.id.clone()],
                discount: 10.0,
            })
            .unwrap();
        BasketService::new(&fx.db, &fx.settings)
            .add_group_discount(user.id.as_str(), &group.id, 1)
            .unwrap();

        let orders = OrderService::new(&fx.db, &fx.settings);
        let order = orders
            .create_order(user.id.as_str(), checkout(&delivery))
            .unwrap();
        let view = orders.view(&order).unwrap();

        let set = &view.group_discounts[0];
        assert_eq!(set.books[0].total, "100.00");
        assert_eq!(set.total, "200.00");
        assert_eq!(set.total_with_discount, "180.00");
        assert_eq!(view.final_sum_with_discounts, set.total_with_discount);
    }

    #[test]
    fn test_transitions_and_cancel_restocks() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let order = place(&fx, &delivery);
        let orders = OrderService::new(&fx.db, &fx.settings);

        let err = orders
            .transition(order.id.as_str(), OrderStatus::Done)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);

        orders
            .transition(order.id.as_str(), OrderStatus::Confirmed)
            .unwrap();
        let canceled = orders.cancel(order.id.as_str()).unwrap();
        assert_eq!(canceled.status, OrderStatus::Canceled);

        let book = CatalogService::new(&fx.db)
            .get(order.books[0].book.as_str())
            .unwrap();
        assert_eq!(book.number_in_stock, 10);

        let err = orders.cancel(order.id.as_str()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
    }

    #[test]
    fn test_payment_flags_exclusive() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let order = place(&fx, &delivery);
        let orders = OrderService::new(&fx.db, &fx.settings);

        let err = orders
            .set_payment(order.id.as_str(), true, true)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
        let paid = orders.set_payment(order.id.as_str(), true, false).unwrap();
        assert!(paid.is_paid);
    }

    #[test]
    fn test_self_pickup_has_no_tracking() {
        let mut fx = Fixture::new();
        let pickup = ReferenceService::<Delivery>::new(&fx.db)
            .create(DeliveryInput {
                name: "Self pickup".to_string(),
                image_id: None,
                tracking_url: None,
            })
            .unwrap();
        fx.settings.self_pickup_delivery_id = Some(pickup.id.clone());

        let order = place(&fx, &pickup);
        let orders = OrderService::new(&fx.db, &fx.settings);
        let err = orders
            .set_tracking_number(order.id.as_str(), Some("2045".into()))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadData);

        // Even a number stored before the delivery became self-pickup is hidden.
        let mut stored = orders.get(order.id.as_str()).unwrap();
        stored.tracking_number = Some("2045".to_string());
        fx.db.replace(&stored).unwrap();
        let view = orders.view(&stored).unwrap();
        assert!(view.is_self_pickup);
        assert!(view.tracking_number.is_none());
        assert!(view.tracking_link.is_none());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("trackingNumber").is_none());
    }

    #[test]
    fn test_tracking_link_for_courier() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let order = place(&fx, &delivery);
        let orders = OrderService::new(&fx.db, &fx.settings);
        let order = orders
            .set_tracking_number(order.id.as_str(), Some(" 20450000 ".into()))
            .unwrap();
        let view = orders.view(&order).unwrap();
        assert_eq!(view.tracking_number.as_deref(), Some("20450000"));
        assert_eq!(
            view.tracking_link.as_deref(),
            Some("https://novaposhta.ua/tracking/?cargo_number=20450000")
        );
        assert_eq!(view.final_sum, "500.00");
        assert_eq!(view.books[0].price, "250.00");
        assert_eq!(view.status_colors, OrderStatus::Created.colors());
    }

    #[test]
    fn test_shipping_editable_until_sent() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let order = place(&fx, &delivery);
        let orders = OrderService::new(&fx.db, &fx.settings);

        let mut details = shipping();
        details.address.city = "Lviv".to_string();
        let updated = orders
            .update_shipping(order.id.as_str(), details.clone())
            .unwrap();
        assert_eq!(updated.shipping.address.city, "Lviv");

        orders
            .transition(order.id.as_str(), OrderStatus::Confirmed)
            .unwrap();
        orders
            .transition(order.id.as_str(), OrderStatus::InDelivery)
            .unwrap();
        let err = orders
            .update_shipping(order.id.as_str(), details)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
    }

    #[test]
    fn test_list_filters() {
        let fx = Fixture::new();
        let delivery = courier(&fx);
        let first = place(&fx, &delivery);
        place(&fx, &delivery);
        let orders = OrderService::new(&fx.db, &fx.settings);
        orders
            .transition(first.id.as_str(), OrderStatus::Confirmed)
            .unwrap();

        let confirmed = orders
            .list(&OrderQuery {
                status: Some(OrderStatus::Confirmed),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(confirmed.total_count, 1);
        assert_eq!(confirmed.items[0].order_number, 1);

        let by_user = orders
            .list(&OrderQuery {
                user: Some(first.user.clone()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_user.total_count, 1);

        assert_eq!(orders.get_by_number(2).unwrap().order_number, 2);
    }
}
