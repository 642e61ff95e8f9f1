//! One side of the book: an ordered price index over `OrderQueue`s.
//!
//! The dual index spec'd as a hash map plus an ordered tree is collapsed
//! into a single `SkipMap<Decimal, Arc<OrderQueue>>` — `Decimal` is `Ord`
//! and hashable on its normalised form, so exact-price lookup, minimum,
//! maximum, and floor/ceiling queries are all served by one structure.

use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::atomic::AtomicCell;
use crossbeam_skiplist::SkipMap;
use rust_decimal::Decimal;

use crate::order::Order;
use crate::order_queue::{OrderQueue, QueueHandle};
use crate::orderbook::error::OrderBookError;

/// Ordered collection of `OrderQueue`s for one side of the book.
pub struct OrderSide {
    prices: SkipMap<Decimal, Arc<OrderQueue>>,
    num_orders: AtomicUsize,
    depth: AtomicUsize,
    volume: AtomicCell<Decimal>,
}

impl OrderSide {
    pub fn new() -> Self {
        OrderSide {
            prices: SkipMap::new(),
            num_orders: AtomicUsize::new(0),
            depth: AtomicUsize::new(0),
            volume: AtomicCell::new(Decimal::ZERO),
        }
    }

    pub fn num_orders(&self) -> usize {
        self.num_orders.load(Ordering::Acquire)
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    pub fn volume(&self) -> Decimal {
        self.volume.load()
    }

    fn add_volume(&self, delta: Decimal) {
        loop {
            let current = self.volume.load();
            let updated = current + delta;
            if self.volume.compare_exchange(current, updated).is_ok() {
                break;
            }
        }
    }

    /// Locate or lazily create the queue at `order.price`, append `order`
    /// to it, and return the price and handle needed to locate it again.
    pub fn append(&self, order: Order) -> Result<(Decimal, QueueHandle), OrderBookError> {
        let price = order.price;
        // Single-writer assumption (see OrderBook's concurrency notes):
        // no concurrent mutation of this side, so this check-then-insert
        // is race-free in practice even though `prices` is a concurrent
        // map.
        let level_existed = self.prices.get(&price).is_some();
        let entry = self
            .prices
            .get_or_insert(price, Arc::new(OrderQueue::new(price)));
        if !level_existed {
            self.depth.fetch_add(1, Ordering::AcqRel);
        }
        let quantity = order.quantity;
        let handle = entry.value().append(order)?;
        self.num_orders.fetch_add(1, Ordering::AcqRel);
        self.add_volume(quantity);
        Ok((price, handle))
    }

    /// Remove the order at `handle` from the queue at `price`. Evicts the
    /// price level if the queue becomes empty as a result.
    pub fn remove(&self, price: Decimal, handle: QueueHandle) -> Result<Order, OrderBookError> {
        let entry = self
            .prices
            .get(&price)
            .ok_or_else(|| OrderBookError::InvalidQueue {
                reason: format!("no queue at price {price}"),
            })?;
        let queue = entry.value().clone();
        drop(entry);
        let order = queue.remove(handle)?;
        self.num_orders.fetch_sub(1, Ordering::AcqRel);
        self.add_volume(-order.quantity);
        if queue.is_empty() {
            self.prices.remove(&price);
            self.depth.fetch_sub(1, Ordering::AcqRel);
        }
        Ok(order)
    }

    /// Write a reduced-quantity replacement back into the queue at
    /// `price`, in place, adjusting this side's aggregate volume.
    pub fn update(
        &self,
        price: Decimal,
        handle: QueueHandle,
        new_order: Order,
    ) -> Result<(), OrderBookError> {
        let entry = self
            .prices
            .get(&price)
            .ok_or_else(|| OrderBookError::InvalidQueue {
                reason: format!("no queue at price {price}"),
            })?;
        let queue = entry.value();
        let delta = {
            let before = queue.volume();
            queue.update(handle, new_order)?;
            queue.volume() - before
        };
        self.add_volume(delta);
        Ok(())
    }

    /// Exact-price lookup, O(1) amortised.
    pub fn queue_at(&self, price: Decimal) -> Option<Arc<OrderQueue>> {
        self.prices.get(&price).map(|e| e.value().clone())
    }

    /// Queue at the best (lowest) price on this side — conventionally
    /// used for the ask side.
    pub fn min_price_queue(&self) -> Option<Arc<OrderQueue>> {
        self.prices.front().map(|e| e.value().clone())
    }

    /// Queue at the best (highest) price on this side — conventionally
    /// used for the bid side.
    pub fn max_price_queue(&self) -> Option<Arc<OrderQueue>> {
        self.prices.back().map(|e| e.value().clone())
    }

    /// The queue with the largest price strictly less than `price`.
    pub fn less_than(&self, price: Decimal) -> Option<Arc<OrderQueue>> {
        self.prices
            .upper_bound(Bound::Excluded(&price))
            .map(|e| e.value().clone())
    }

    /// The queue with the smallest price strictly greater than `price`.
    pub fn greater_than(&self, price: Decimal) -> Option<Arc<OrderQueue>> {
        self.prices
            .lower_bound(Bound::Excluded(&price))
            .map(|e| e.value().clone())
    }

    /// All price levels ascending, as `(price, volume)` pairs. Used by
    /// `OrderBook::depth`.
    pub fn levels_ascending(&self) -> Vec<(Decimal, Decimal)> {
        self.prices
            .iter()
            .map(|e| (*e.key(), e.value().volume()))
            .collect()
    }

    /// All price levels ordered from this side's best price outward: for
    /// a `Buy` taker (this side is the ask book) that is ascending from
    /// the lowest ask; for a `Sell` taker (this side is the bid book)
    /// that is descending from the highest bid. Used by
    /// `OrderBook::calculate_market_price` to walk liquidity the same
    /// way the matching loop consumes it.
    pub fn levels_ascending_from_best(&self, taker_side: crate::order::Side) -> Vec<(Decimal, Decimal)> {
        let mut levels = self.levels_ascending();
        if taker_side == crate::order::Side::Sell {
            levels.reverse();
        }
        levels
    }

    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }
}

impl Default for OrderSide {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderId, Side};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(id: &str, side: Side, quantity: Decimal, price: Decimal) -> Order {
        Order::new(OrderId::from(id), side, quantity, price, Utc::now())
    }

    #[test]
    fn append_creates_price_level_once() {
        let side = OrderSide::new();
        side.append(order("a", Side::Buy, dec!(1), dec!(100))).unwrap();
        side.append(order("b", Side::Buy, dec!(1), dec!(100))).unwrap();
        assert_eq!(side.depth(), 1);
        assert_eq!(side.num_orders(), 2);
        assert_eq!(side.volume(), dec!(2));
    }

    #[test]
    fn remove_evicts_empty_level() {
        let side = OrderSide::new();
        let (price, handle) = side.append(order("a", Side::Buy, dec!(1), dec!(100))).unwrap();
        side.remove(price, handle).unwrap();
        assert_eq!(side.depth(), 0);
        assert_eq!(side.num_orders(), 0);
        assert!(side.min_price_queue().is_none());
    }

    #[test]
    fn min_and_max_price_queue_are_true_extrema() {
        let side = OrderSide::new();
        for p in [90, 70, 80, 50, 60] {
            side.append(order(&p.to_string(), Side::Buy, dec!(1), Decimal::from(p)))
                .unwrap();
        }
        assert_eq!(side.min_price_queue().unwrap().price(), dec!(50));
        assert_eq!(side.max_price_queue().unwrap().price(), dec!(90));
    }

    #[test]
    fn less_than_and_greater_than_are_strict_floor_ceiling() {
        let side = OrderSide::new();
        for p in [50, 60, 70, 80, 90] {
            side.append(order(&p.to_string(), Side::Buy, dec!(1), Decimal::from(p)))
                .unwrap();
        }
        assert_eq!(side.less_than(dec!(70)).unwrap().price(), dec!(60));
        assert_eq!(side.greater_than(dec!(70)).unwrap().price(), dec!(80));
        assert!(side.less_than(dec!(50)).is_none());
        assert!(side.greater_than(dec!(90)).is_none());
        // strict: price itself must not be returned
        assert_eq!(side.less_than(dec!(71)).unwrap().price(), dec!(70));
    }

    #[test]
    fn levels_ascending_orders_by_price() {
        let side = OrderSide::new();
        for p in [90, 50, 70] {
            side.append(order(&p.to_string(), Side::Buy, dec!(2), Decimal::from(p)))
                .unwrap();
        }
        let levels = side.levels_ascending();
        let prices: Vec<_> = levels.iter().map(|(p, _)| *p).collect();
        assert_eq!(prices, vec![dec!(50), dec!(70), dec!(90)]);
    }
}
