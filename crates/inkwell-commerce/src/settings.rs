//! Shop-wide settings.

use serde::{Deserialize, Serialize};

use crate::basket::DiscountPrecedence;
use crate::ids::DeliveryId;
use crate::money::Currency;

/// Maximum copies of one book (or bundles of one group discount) per basket line.
pub const MAX_COUNT_PER_LINE: i64 = 99;

/// How many recently viewed books a user keeps.
pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// Settings that shape pricing and order handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSettings {
    /// Currency of all catalog prices.
    pub currency: Currency,
    /// Delivery method where the customer collects the order in person.
    pub self_pickup_delivery_id: Option<DeliveryId>,
    /// Which discount wins when a book is both discounted and in a group.
    pub discount_precedence: DiscountPrecedence,
    /// Per-line count cap.
    pub max_count_per_line: i64,
    /// Length of the recently viewed list.
    pub recently_viewed_limit: usize,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            currency: Currency::UAH,
            self_pickup_delivery_id: None,
            discount_precedence: DiscountPrecedence::default(),
            max_count_per_line: MAX_COUNT_PER_LINE,
            recently_viewed_limit: RECENTLY_VIEWED_LIMIT,
        }
    }
}

impl ShopSettings {
    /// Whether the delivery method is the self-pickup one.
    pub fn is_self_pickup(&self, delivery_id: &DeliveryId) -> bool {
        self.self_pickup_delivery_id.as_ref() == Some(delivery_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: ShopSettings =
            serde_json::from_str(r#"{"self_pickup_delivery_id": "pickup"}"#).unwrap();
        assert!(settings.is_self_pickup(&DeliveryId::new("pickup")));
        assert!(!settings.is_self_pickup(&DeliveryId::new("courier")));
        assert_eq!(settings.max_count_per_line, MAX_COUNT_PER_LINE);
    }
}
