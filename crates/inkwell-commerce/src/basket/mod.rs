//! Basket: lines stored on the user, pricing and the service.

#[allow(clippy::module_inception)]
mod basket;
mod pricing;
mod service;

pub use basket::{Basket, BasketGroupDiscount, BasketItem, ReconcileReport};
pub use pricing::{
    price_basket, BasketPricing, BookLine, BundleLine, BundlePricing, DiscountPrecedence,
    GroupMatch, GroupOffer, LinePricing, PricedBook,
};
pub use service::{BasketQuote, BasketService, ReconciledBasket};
