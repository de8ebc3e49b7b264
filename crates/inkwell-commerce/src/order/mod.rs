//! Orders: snapshots of a basket at checkout, the status state machine and
//! back-office operations.

#[allow(clippy::module_inception)]
mod order;
mod service;
mod status;
mod view;

pub use order::{
    Order, OrderBook, OrderGroupDiscount, OrderTotals, ShippingAddress, ShippingDetails,
};
pub use service::{CreateOrderInput, OrderQuery, OrderService};
pub use status::{OrderStatus, StatusColors};
pub use view::{OrderGroupDiscountView, OrderLineView, OrderView};
