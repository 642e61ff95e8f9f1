//! The root façade: validates incoming orders, drives the matching loop,
//! and keeps both sides and the id index mutually consistent.

use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::clock::{Clock, SystemClock};
use crate::order::{OrderId, Side};
use crate::order_queue::QueueHandle;
use crate::order_side::OrderSide;

/// Where a resting order currently lives: which side, at which price,
/// and which handle inside that price's queue.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderLocation {
    pub side: Side,
    pub price: Decimal,
    pub handle: QueueHandle,
}

/// A limit order book for a single instrument.
///
/// This type is **not** internally serialized against concurrent
/// mutation: its fields are concurrent collections (`SkipMap`,
/// `DashMap`, atomics) so that every public method takes `&self`, but two
/// matching calls against the *same* book must still not be interleaved
/// — matching is inherently sequential (see the engine's concurrency
/// model). Callers that need multi-writer access must externally
/// serialize calls, e.g. behind a single writer thread or a mutex around
/// the whole `OrderBook`.
pub struct OrderBook<C: Clock = SystemClock> {
    pub(crate) symbol: String,
    pub(crate) bids: OrderSide,
    pub(crate) asks: OrderSide,
    pub(crate) orders: DashMap<OrderId, OrderLocation>,
    pub(crate) clock: C,
}

impl OrderBook<SystemClock> {
    /// A new, empty book for `symbol`, stamping admitted orders with the
    /// system wall clock.
    pub fn new(symbol: impl Into<String>) -> Self {
        OrderBook::with_clock(symbol, SystemClock)
    }
}

impl<C: Clock> OrderBook<C> {
    /// A new, empty book stamping admitted orders with `clock` — used in
    /// tests to get deterministic, strictly increasing timestamps.
    pub fn with_clock(symbol: impl Into<String>, clock: C) -> Self {
        OrderBook {
            symbol: symbol.into(),
            bids: OrderSide::new(),
            asks: OrderSide::new(),
            orders: DashMap::new(),
            clock,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub(crate) fn side(&self, side: Side) -> &OrderSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Total count of resting orders across both sides. Equal to
    /// `bids.num_orders + asks.num_orders` by construction.
    pub fn num_orders(&self) -> usize {
        self.orders.len()
    }
}
