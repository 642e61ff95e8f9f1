//! Read-only lookups, cancellation, depth snapshots, and the weighted
//! market-price query — everything in `OrderBook`'s surface besides the
//! matching loop itself.

use rust_decimal::Decimal;
use tracing::trace;

use crate::clock::Clock;
use crate::order::{Order, OrderId, Side};

use super::book::OrderBook;
use super::error::OrderBookError;

/// Aggregate (price, volume) for one resting price level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthLevel {
    pub price: Decimal,
    pub volume: Decimal,
}

/// A snapshot of both sides' resting depth, each ascending by price.
#[derive(Debug, Clone, Default)]
pub struct BookDepth {
    pub asks: Vec<DepthLevel>,
    pub bids: Vec<DepthLevel>,
}

impl<C: Clock> OrderBook<C> {
    /// Detach `id` from its side and the id index, returning the
    /// removed order. Cancelling an id that is not currently resting is
    /// not an error — it simply returns `None`.
    pub fn cancel_order(&self, id: &OrderId) -> Option<Order> {
        let (_, location) = self.orders.remove(id)?;
        trace!(%id, side = %location.side, price = %location.price, "cancelling resting order");
        self.side(location.side)
            .remove(location.price, location.handle)
            .ok()
    }

    /// Read-only lookup of a resting order by id.
    pub fn order(&self, id: &OrderId) -> Option<Order> {
        let location = *self.orders.get(id)?;
        // The handle locates a slot inside the queue at `location.price`;
        // walking the queue is the only way to recover the order value,
        // since handles do not carry it themselves.
        self.side(location.side)
            .queue_at(location.price)
            .and_then(|queue| queue.orders().into_iter().find(|o| &o.id == id))
    }

    /// Snapshot of (price, aggregate volume) per level on both sides,
    /// each ascending by price.
    pub fn depth(&self) -> BookDepth {
        let to_levels = |levels: Vec<(Decimal, Decimal)>| {
            levels
                .into_iter()
                .map(|(price, volume)| DepthLevel { price, volume })
                .collect()
        };
        BookDepth {
            asks: to_levels(self.asks.levels_ascending()),
            bids: to_levels(self.bids.levels_ascending()),
        }
    }

    /// Walk the opposing side from the best price outward, accumulating
    /// `price * consumed` per level until `quantity` is satisfied.
    ///
    /// If the opposing side cannot supply `quantity`, returns the
    /// notional accumulated over all available liquidity together with
    /// `InsufficientQuantity`.
    pub fn calculate_market_price(
        &self,
        side: Side,
        quantity: Decimal,
    ) -> Result<Decimal, OrderBookError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderBookError::InvalidQuantity);
        }

        let opposing = self.side(side.opposite());
        let mut remaining = quantity;
        let mut notional = Decimal::ZERO;

        for (price, volume) in opposing.levels_ascending_from_best(side) {
            if remaining <= Decimal::ZERO {
                break;
            }
            let consumed = remaining.min(volume);
            notional += price * consumed;
            remaining -= consumed;
        }

        if remaining > Decimal::ZERO {
            return Err(OrderBookError::InsufficientQuantity {
                requested: quantity,
                available: quantity - remaining,
            });
        }
        Ok(notional)
    }
}
