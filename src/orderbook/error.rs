//! The error taxonomy surfaced by every `OrderBook` operation.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::order::OrderId;

/// Errors returned by `OrderQueue`, `OrderSide`, and `OrderBook`.
///
/// Variants map directly onto the kinds enumerated for this engine:
/// validation failures on quantity/price, identity conflicts, structural
/// misuse of a handle, and insufficient liquidity for a price query.
/// None of these retry internally and none leave partial state behind —
/// validation is total before any mutation is applied.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderBookError {
    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("price must be positive")]
    InvalidPrice,

    #[error("order {id} already rests in the book")]
    OrderExists { id: OrderId },

    #[error("order {id} is not resting in the book")]
    OrderNotExists { id: OrderId },

    #[error("requested quantity {requested} exceeds available liquidity {available}")]
    InsufficientQuantity {
        requested: Decimal,
        available: Decimal,
    },

    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("order {id} is already linked into a queue")]
    AlreadyLinked { id: OrderId },

    #[error("invalid queue operation: {reason}")]
    InvalidQueue { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_messages_are_stable() {
        let err = OrderBookError::InsufficientQuantity {
            requested: dec!(200),
            available: dec!(150),
        };
        assert_eq!(
            err.to_string(),
            "requested quantity 200 exceeds available liquidity 150"
        );
    }

    #[test]
    fn order_exists_carries_the_id() {
        let err = OrderBookError::OrderExists {
            id: OrderId::from("dup-1"),
        };
        assert!(err.to_string().contains("dup-1"));
    }
}
