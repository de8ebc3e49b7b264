//! Bookstore domain types and services for Inkwell.
//!
//! - **Catalog**: books, list filters, views joined with references
//! - **Reference**: authors, book types, languages and the other lookup
//!   entities behind one generic CRUD service
//! - **Basket**: lines stored on the user, pricing with group discounts
//! - **Order**: checkout snapshots and the status state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use inkwell_commerce::prelude::*;
//!
//! let shop = Shop::in_memory(ShopSettings::default());
//! let language = shop
//!     .references::<Language>()
//!     .create(NameInput::new("Ukrainian"))?;
//!
//! // Price whatever the user has in the basket.
//! let quote = shop.baskets().price(user.id.as_str())?;
//! println!("Total: {}", quote.final_sum_with_discounts);
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod page;
pub mod settings;

pub mod basket;
pub mod catalog;
pub mod group_discount;
pub mod order;
pub mod reference;
pub mod shop;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{CommerceError, ErrorCode};
pub use ids::*;
pub use money::{Currency, Money};
pub use shop::Shop;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, ErrorCode};
    pub use crate::ids::*;
    pub use crate::money::{render_price, Currency, Money};
    pub use crate::page::{Page, PageSettings};
    pub use crate::settings::ShopSettings;
    pub use crate::shop::{Shop, ShopStats};

    // Catalog
    pub use crate::catalog::{Book, BookFilters, BookInput, BookView};
    pub use crate::group_discount::{GroupDiscount, GroupDiscountInput, GroupDiscountQuery};

    // References
    pub use crate::reference::{
        Author, AuthorInput, BookSeries, BookSeriesInput, BookType, CoverType, Delivery,
        DeliveryInput, Language, NameInput, NameQuery, PageType, PublishingHouse,
        PublishingHouseInput, ReferenceEntity,
    };

    // Basket
    pub use crate::basket::{Basket, BasketPricing, BasketQuote, DiscountPrecedence};

    // Orders
    pub use crate::order::{
        CreateOrderInput, Order, OrderQuery, OrderStatus, OrderView, ShippingAddress,
        ShippingDetails,
    };

    // Users
    pub use crate::user::{Role, User, UserInput, UserQuery};
}

/// Current time as a Unix timestamp in milliseconds.
pub(crate) fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
