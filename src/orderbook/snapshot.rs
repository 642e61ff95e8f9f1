//! Structured (de)serialization of a book's resting state.
//!
//! Schema per the external-interfaces contract: each side serializes as
//! `{ num_orders, depth, prices }`, `prices` mapping a canonical
//! price-string to a queue object, each queue object an ordered array of
//! orders. Deserialization never trusts the document's aggregates —
//! every order is re-admitted through `OrderSide::append`, so the
//! invariants tying `num_orders`/`depth`/`volume` to the actual contents
//! hold immediately after load, the same as they do at runtime.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::clock::Clock;
use crate::order::{Order, OrderId, Side};
use crate::order_queue::OrderQueue;
use crate::order_side::OrderSide;

use super::book::{OrderBook, OrderLocation};
use super::error::OrderBookError;

/// One resting order as it appears inside a `QueueSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub side: Side,
    pub id: OrderId,
    /// RFC 3339, nanosecond precision (`chrono`'s default `DateTime<Utc>`
    /// serde representation).
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl From<&Order> for OrderSnapshot {
    fn from(order: &Order) -> Self {
        OrderSnapshot {
            side: order.side,
            id: order.id.clone(),
            timestamp: order.timestamp,
            quantity: order.quantity,
            price: order.price,
        }
    }
}

impl From<OrderSnapshot> for Order {
    fn from(snap: OrderSnapshot) -> Self {
        Order::new(snap.id, snap.side, snap.quantity, snap.price, snap.timestamp)
    }
}

/// One price level: its aggregate volume, its price, and its resting
/// orders in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub volume: Decimal,
    pub price: Decimal,
    pub orders: Vec<OrderSnapshot>,
}

impl From<&OrderQueue> for QueueSnapshot {
    fn from(queue: &OrderQueue) -> Self {
        QueueSnapshot {
            volume: queue.volume(),
            price: queue.price(),
            orders: queue.orders().iter().map(OrderSnapshot::from).collect(),
        }
    }
}

/// One side of the book: its order/level counts and a canonical
/// price-string-keyed map of queues.
///
/// `prices` is a `BTreeMap` rather than a `HashMap` so the serialized
/// form is deterministic (matters for the round-trip byte-equality
/// property) and so reconstructing the ordered price index can simply
/// walk the map in order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SideSnapshot {
    pub num_orders: usize,
    pub depth: usize,
    pub prices: BTreeMap<String, QueueSnapshot>,
}

impl From<&OrderSide> for SideSnapshot {
    fn from(side: &OrderSide) -> Self {
        let mut prices = BTreeMap::new();
        for (price, _volume) in side.levels_ascending() {
            if let Some(queue) = side.queue_at(price) {
                prices.insert(canonical_price_key(price), QueueSnapshot::from(&*queue));
            }
        }
        SideSnapshot {
            num_orders: side.num_orders(),
            depth: side.depth(),
            prices,
        }
    }
}

/// Canonical textual key for a price: the normalised decimal
/// representation, so two prices with the same numeric value always
/// produce the same key (spec's hash-index canonicalisation
/// requirement).
fn canonical_price_key(price: Decimal) -> String {
    price.normalize().to_string()
}

/// A full snapshot of both sides' resting state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BookSnapshot {
    pub symbol: String,
    pub asks: SideSnapshot,
    pub bids: SideSnapshot,
}

impl BookSnapshot {
    /// Capture the current resting state of `book`.
    pub fn from_book<C: Clock>(book: &OrderBook<C>) -> Self {
        BookSnapshot {
            symbol: book.symbol().to_string(),
            asks: SideSnapshot::from(&book.asks),
            bids: SideSnapshot::from(&book.bids),
        }
    }

    /// Rebuild an `OrderBook` from this snapshot by re-admitting every
    /// order through the normal `OrderSide::append` path (not a trusted
    /// fast-path loader), so the book's invariants hold immediately.
    /// Orders are replayed in arrival order within each queue (the order
    /// that determines time priority); the order in which queues
    /// themselves are visited does not matter, since each order carries
    /// its own price and lands in the correct level regardless.
    pub fn restore<C: Clock>(&self, clock: C) -> Result<OrderBook<C>, OrderBookError> {
        let book = OrderBook::with_clock(self.symbol.clone(), clock);

        for side_snapshot in [&self.bids, &self.asks] {
            for queue_snapshot in side_snapshot.prices.values() {
                for order_snapshot in &queue_snapshot.orders {
                    let order = Order::from(order_snapshot.clone());
                    let side = book.side(order.side);
                    let (price, handle) = side.append(order.clone())?;
                    book.orders.insert(
                        order.id.clone(),
                        OrderLocation {
                            side: order.side,
                            price,
                            handle,
                        },
                    );
                }
            }
        }

        Ok(book)
    }
}

/// Schema version for the checksum-wrapped snapshot document.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Errors from wrapping, serializing, or validating a `SnapshotPackage`.
///
/// Kept separate from `OrderBookError`: spec.md's §7 taxonomy is
/// entirely about validation/structural failures inside the matching
/// engine itself, while these are document-integrity failures on an
/// ambient (de)serialization concern layered on top of it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("unsupported snapshot version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("snapshot checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },
}

/// `BookSnapshot` wrapped with a schema version and a SHA-256 checksum
/// of its serialized contents, so a consumer can detect truncation or
/// tampering before trusting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    pub version: u32,
    pub snapshot: BookSnapshot,
    pub checksum: String,
}

impl SnapshotPackage {
    /// Wrap `snapshot`, computing its checksum.
    pub fn new(snapshot: BookSnapshot) -> Result<Self, SnapshotError> {
        let checksum = Self::compute_checksum(&snapshot)?;
        Ok(SnapshotPackage {
            version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    pub fn from_json(data: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(data).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    /// Verify the version and checksum without consuming the package.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(SnapshotError::ChecksumMismatch {
                expected: self.checksum.clone(),
                computed,
            });
        }
        Ok(())
    }

    pub fn into_snapshot(self) -> Result<BookSnapshot, SnapshotError> {
        self.validate()?;
        Ok(self.snapshot)
    }

    fn compute_checksum(snapshot: &BookSnapshot) -> Result<String, SnapshotError> {
        let payload = serde_json::to_vec(snapshot)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(payload);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
