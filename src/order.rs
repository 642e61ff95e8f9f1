//! Value types shared by every layer of the book: the side tag, the
//! order identifier, and the resting/incoming order itself.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Buy (bid) or sell (ask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposing side: asks for a buy, bids for a sell.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// An opaque, caller-supplied order identifier.
///
/// Backed by `Arc<str>` rather than `String` so the id can be cloned
/// cheaply into the `Order` value, the id index, and every `Fill` record
/// that references it without an allocation per clone.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Arc<str>);

impl OrderId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        OrderId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderId({:?})", self.0)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        OrderId(Arc::from(s))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        OrderId(Arc::from(s))
    }
}

/// A resting or incoming bid/ask.
///
/// Immutable by convention: a partial fill never mutates an `Order` in
/// place from the caller's point of view. It is replaced with a new
/// value carrying the reduced quantity, written back into the same queue
/// position via `OrderQueue::update` (see `order_queue`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: OrderId,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Order {
            id,
            side,
            quantity,
            price,
            timestamp,
        }
    }

    /// A replacement value carrying a reduced quantity, same identity,
    /// side, price and timestamp. Used for the partial-fill writeback in
    /// `OrderBook::process_limit_order`/`process_market_order`.
    pub fn with_reduced_quantity(&self, new_quantity: Decimal) -> Order {
        Order {
            id: self.id.clone(),
            side: self.side,
            quantity: new_quantity,
            price: self.price,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_opposite_is_involutive() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"sell\"");
    }

    #[test]
    fn order_id_cheap_clone_preserves_equality() {
        let a = OrderId::from("order-1");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "order-1");
    }

    #[test]
    fn with_reduced_quantity_preserves_identity_and_timestamp() {
        let ts = Utc::now();
        let order = Order::new(OrderId::from("x"), Side::Buy, dec!(10), dec!(100), ts);
        let reduced = order.with_reduced_quantity(dec!(4));
        assert_eq!(reduced.id, order.id);
        assert_eq!(reduced.side, order.side);
        assert_eq!(reduced.price, order.price);
        assert_eq!(reduced.timestamp, order.timestamp);
        assert_eq!(reduced.quantity, dec!(4));
    }
}
