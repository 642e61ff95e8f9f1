//! Trade records and the reports returned from matching.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::Order;

/// One resting order fully consumed by an incoming order.
///
/// `done` on a `LimitOrderReport`/`MarketOrderReport` is exactly the list
/// of these records — no synthetic volume-weighted aggregate is
/// appended when the incoming order finishes filling (see DESIGN.md for
/// why that variant of the source behaviour was not adopted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    /// Unique id for this fill, independent of either order's id.
    pub transaction_id: Uuid,
    /// The resting order that was consumed.
    pub maker_order: Order,
    /// The execution price — always the maker's resting price.
    pub price: Decimal,
    /// The quantity executed in this fill.
    pub quantity: Decimal,
}

impl Fill {
    pub fn new(maker_order: Order, quantity: Decimal) -> Self {
        Fill {
            transaction_id: Uuid::new_v4(),
            price: maker_order.price,
            maker_order,
            quantity,
        }
    }
}

/// Outcome of `OrderBook::process_limit_order`.
#[derive(Debug, Clone, Default)]
pub struct LimitOrderReport {
    /// Resting orders fully consumed by the incoming order, in the order
    /// they were matched.
    pub done: Vec<Fill>,
    /// Either the in-place replacement of a partially-filled resting
    /// order, or the resting remainder of the incoming order itself, if
    /// either occurred.
    pub partial: Option<Order>,
    /// The quantity represented by `partial`'s most recent fill, if any.
    pub partial_filled: Option<Decimal>,
}

/// Outcome of `OrderBook::process_market_order`.
#[derive(Debug, Clone, Default)]
pub struct MarketOrderReport {
    pub done: Vec<Fill>,
    pub partial: Option<Order>,
    pub partial_filled: Option<Decimal>,
    /// Quantity that could not be matched because the opposing side was
    /// exhausted. Zero means the order was fully satisfied.
    pub quantity_left: Decimal,
}
