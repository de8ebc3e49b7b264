//! Order documents.

use inkwell_db::Document;
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::error::CommerceError;
use crate::ids::{BookId, DeliveryId, GroupDiscountId, OrderId, UserId};
use crate::money::Money;

/// Where the order goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub city: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat: Option<String>,
    /// Carrier branch, when not delivered to the door.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
}

/// Customer contact and address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: ShippingAddress,
}

impl ShippingDetails {
    /// Required fields must be filled in.
    ///
    /// Self-pickup orders need no address beyond the city.
    pub fn validate(&self, self_pickup: bool) -> Result<(), CommerceError> {
        let required = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("city", &self.address.city),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CommerceError::InvalidData(format!("{} is required", field)));
            }
        }
        if !self.email.contains('@') {
            return Err(CommerceError::InvalidData(format!(
                "\"{}\" is not an email address",
                self.email
            )));
        }
        if self_pickup {
            return Ok(());
        }

        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let to_door = filled(&self.address.street) && filled(&self.address.house);
        if !to_door && !filled(&self.address.warehouse) {
            return Err(CommerceError::InvalidData(
                "either a warehouse or a street and house is required".into(),
            ));
        }
        Ok(())
    }
}

/// Snapshot of an ordered book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    pub book: BookId,
    pub name: String,
    pub count: i64,
    /// Unit price at the time of ordering.
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

/// Snapshot of an ordered group discount bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGroupDiscount {
    pub group_discount: GroupDiscountId,
    /// One copy of each book of the set.
    pub books: Vec<OrderBook>,
    pub count: i64,
    pub discount: f64,
    /// What one set cost after discounts.
    pub set_price_with_discount: Money,
}

/// Totals at the time of ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub final_sum: Money,
    pub final_sum_with_discounts: Money,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Sequential, starting at 1.
    pub order_number: i64,
    pub user: UserId,
    pub shipping: ShippingDetails,
    pub delivery: DeliveryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_partly_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_comment: Option<String>,
    pub books: Vec<OrderBook>,
    #[serde(default)]
    pub group_discounts: Vec<OrderGroupDiscount>,
    pub totals: OrderTotals,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Order {
    /// Copies of each book the order holds, loose and in bundles.
    pub fn book_quantities(&self) -> Vec<(BookId, i64)> {
        let mut quantities: Vec<(BookId, i64)> = Vec::new();
        let mut push = |book: &BookId, count: i64| {
            match quantities.iter_mut().find(|(id, _)| id == book) {
                Some((_, total)) => *total += count,
                None => quantities.push((book.clone(), count)),
            }
        };
        for line in &self.books {
            push(&line.book, line.count);
        }
        for bundle in &self.group_discounts {
            for line in &bundle.books {
                push(&line.book, line.count * bundle.count);
            }
        }
        quantities
    }

    pub fn touch(&mut self) {
        self.updated_at = crate::current_timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ShippingDetails {
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

    #[test]
    fn test_shipping_needs_destination() {
        assert!(details().validate(false).is_ok());

        let mut no_destination = details();
        no_destination.address.warehouse = None;
        assert!(no_destination.validate(false).is_err());
        assert!(no_destination.validate(true).is_ok());

        no_destination.address.street = Some("Khreshchatyk".to_string());
        no_destination.address.house = Some("1".to_string());
        assert!(no_destination.validate(false).is_ok());
    }

    #[test]
    fn test_shipping_required_fields() {
        let mut missing = details();
        missing.phone = "  ".to_string();
        assert!(matches!(
            missing.validate(false),
            Err(CommerceError::InvalidData(_))
        ));
    }
}
