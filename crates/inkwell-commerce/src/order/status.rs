//! Order status state machine and its display palette.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// ```text
/// Created -> Confirmed -> Waiting ----> Done
///    |           |  \        |          ^
///    |           |   \       v          |
///    |           |    `--> InDelivery --'
///    v           v
///  Canceled <----'
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    /// Placed by the customer.
    #[default]
    Created,
    /// Accepted by the shop.
    Confirmed,
    /// Waiting for pickup or payment.
    Waiting,
    /// Handed to the carrier.
    InDelivery,
    /// Delivered or picked up.
    Done,
    /// Canceled; stock has been returned.
    Canceled,
}

/// Background, text and border colours of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusColors {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

const PALETTE: [StatusColors; 5] = [
    StatusColors {
        background: "#e3f2fd",
        text: "#0d47a1",
        border: "#90caf9",
    },
    StatusColors {
        background: "#ede7f6",
        text: "#4527a0",
        border: "#b39ddb",
    },
    StatusColors {
        background: "#fff8e1",
        text: "#e65100",
        border: "#ffcc80",
    },
    StatusColors {
        background: "#e8f5e9",
        text: "#1b5e20",
        border: "#a5d6a7",
    },
    StatusColors {
        background: "#ffebee",
        text: "#b71c1c",
        border: "#ef9a9a",
    },
];

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Created,
        OrderStatus::Confirmed,
        OrderStatus::Waiting,
        OrderStatus::InDelivery,
        OrderStatus::Done,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Waiting => "waiting",
            OrderStatus::InDelivery => "inDelivery",
            OrderStatus::Done => "done",
            OrderStatus::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Waiting => "Waiting for pickup/payment",
            OrderStatus::InDelivery => "In delivery",
            OrderStatus::Done => "Done",
            OrderStatus::Canceled => "Canceled",
        }
    }

    /// Whether an admin may move an order from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Created, Confirmed)
                | (Created, Canceled)
                | (Confirmed, Waiting)
                | (Confirmed, InDelivery)
                | (Confirmed, Canceled)
                | (Waiting, InDelivery)
                | (Waiting, Done)
                | (InDelivery, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Done | OrderStatus::Canceled)
    }

    /// Shipping details may still change.
    pub fn is_editable(&self) -> bool {
        matches!(self, OrderStatus::Created | OrderStatus::Confirmed)
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed
                | OrderStatus::Waiting
                | OrderStatus::InDelivery
                | OrderStatus::Done
        )
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, OrderStatus::InDelivery | OrderStatus::Done)
    }

    /// Index into the badge palette.
    pub fn palette_index(&self) -> usize {
        match self {
            OrderStatus::Created => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Waiting | OrderStatus::InDelivery => 2,
            OrderStatus::Done => 3,
            OrderStatus::Canceled => 4,
        }
    }

    pub fn colors(&self) -> StatusColors {
        PALETTE[self.palette_index()]
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
