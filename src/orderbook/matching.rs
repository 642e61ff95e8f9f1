//! The price-time priority matching loop shared by limit and market
//! orders: walk the opposing side's best price queue, consume heads,
//! write a reduced-quantity replacement in place on a partial fill.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::trace;

use crate::clock::Clock;
use crate::order::{Order, Side};
use crate::order_queue::OrderQueue;
use crate::order_side::OrderSide;

use super::book::{OrderBook, OrderLocation};
use super::error::OrderBookError;
use super::trade::{Fill, LimitOrderReport, MarketOrderReport};

/// Does `best_price` satisfy an incoming order's limit on `side`?
/// Buys cross asks priced at or below their limit; sells cross bids
/// priced at or above theirs.
fn crosses(side: Side, best_price: Decimal, limit_price: Decimal) -> bool {
    match side {
        Side::Buy => best_price <= limit_price,
        Side::Sell => best_price >= limit_price,
    }
}

/// Best resting queue on the opposing side for an incoming order of
/// `side`: lowest ask for a buy, highest bid for a sell.
fn best_opposing_queue(opposing: &OrderSide, side: Side) -> Option<Arc<OrderQueue>> {
    match side {
        Side::Buy => opposing.min_price_queue(),
        Side::Sell => opposing.max_price_queue(),
    }
}

/// Result of consuming one level's head against `remaining` quantity.
enum LevelOutcome {
    /// The head was fully consumed; the maker order is gone.
    Consumed(Fill),
    /// The head absorbed the whole remaining quantity and was reduced
    /// in place; matching is complete.
    PartiallyFilled { replacement: Order, filled: Decimal },
}

/// Consume (fully or partially) the head of `queue`, which must be
/// non-empty, removing it from `opposing` and the book's id index on a
/// full consume.
fn consume_head<C: Clock>(
    book: &OrderBook<C>,
    opposing: &OrderSide,
    queue: &Arc<OrderQueue>,
    remaining: Decimal,
) -> Result<LevelOutcome, OrderBookError> {
    let (handle, head) = queue
        .head_with_handle()
        .expect("queue reported non-empty by the ordered index");
    let price = queue.price();

    if remaining < head.quantity {
        let replacement = head.with_reduced_quantity(head.quantity - remaining);
        opposing.update(price, handle, replacement.clone())?;
        Ok(LevelOutcome::PartiallyFilled {
            replacement,
            filled: remaining,
        })
    } else {
        let removed = opposing.remove(price, handle)?;
        book.orders.remove(&removed.id);
        Ok(LevelOutcome::Consumed(Fill::new(removed.clone(), removed.quantity)))
    }
}

/// Shared matching loop. `limit_price` is `None` for market orders (no
/// price-cross guard — consume until filled or the opposing side is
/// exhausted).
fn run_matching_loop<C: Clock>(
    book: &OrderBook<C>,
    side: Side,
    mut remaining: Decimal,
    limit_price: Option<Decimal>,
) -> Result<(Vec<Fill>, Option<Order>, Option<Decimal>, Decimal), OrderBookError> {
    let opposing = book.side(side.opposite());
    let mut done = Vec::new();
    let mut partial: Option<Order> = None;
    let mut partial_filled: Option<Decimal> = None;

    while remaining > Decimal::ZERO {
        let Some(queue) = best_opposing_queue(opposing, side) else {
            break;
        };
        let best_price = queue.price();
        if let Some(limit) = limit_price {
            if !crosses(side, best_price, limit) {
                break;
            }
        }

        match consume_head(book, opposing, &queue, remaining)? {
            LevelOutcome::Consumed(fill) => {
                trace!(
                    maker_id = %fill.maker_order.id,
                    price = %fill.price,
                    quantity = %fill.quantity,
                    "matched and removed resting order"
                );
                remaining -= fill.quantity;
                done.push(fill);
            }
            LevelOutcome::PartiallyFilled {
                replacement,
                filled,
            } => {
                trace!(
                    maker_id = %replacement.id,
                    remaining_quantity = %replacement.quantity,
                    filled = %filled,
                    "partially filled resting order, residual stays at head"
                );
                partial = Some(replacement);
                partial_filled = Some(filled);
                remaining = Decimal::ZERO;
            }
        }
    }

    Ok((done, partial, partial_filled, remaining))
}

impl<C: Clock> OrderBook<C> {
    /// Admit a limit order, matching it against resting liquidity on the
    /// opposing side and resting any remainder on this side.
    ///
    /// # Errors
    /// `InvalidQuantity` if `quantity <= 0`, `InvalidPrice` if
    /// `price <= 0`, `OrderExists` if `id` already rests in the book.
    /// No state is mutated before every precondition has been checked.
    pub fn process_limit_order(
        &self,
        side: Side,
        id: crate::order::OrderId,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<LimitOrderReport, OrderBookError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderBookError::InvalidQuantity);
        }
        if price <= Decimal::ZERO {
            return Err(OrderBookError::InvalidPrice);
        }
        if self.orders.contains_key(&id) {
            return Err(OrderBookError::OrderExists { id });
        }

        trace!(%id, %side, %quantity, %price, "processing limit order");

        let (done, mut partial, mut partial_filled, remaining) =
            run_matching_loop(self, side, quantity, Some(price))?;

        if remaining > Decimal::ZERO {
            let timestamp = self.clock.now();
            let resting = Order::new(id.clone(), side, remaining, price, timestamp);
            let (resting_price, handle) = self.side(side).append(resting.clone())?;
            self.orders.insert(
                id,
                OrderLocation {
                    side,
                    price: resting_price,
                    handle,
                },
            );
            if !done.is_empty() {
                partial = Some(resting);
                partial_filled = Some(quantity - remaining);
            }
        }

        Ok(LimitOrderReport {
            done,
            partial,
            partial_filled,
        })
    }

    /// Admit a market order: matches until filled or the opposing side
    /// is exhausted, never rests a remainder.
    ///
    /// # Errors
    /// `InvalidQuantity` if `quantity <= 0`.
    pub fn process_market_order(
        &self,
        side: Side,
        quantity: Decimal,
    ) -> Result<MarketOrderReport, OrderBookError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderBookError::InvalidQuantity);
        }

        trace!(%side, %quantity, "processing market order");

        let (done, partial, partial_filled, quantity_left) =
            run_matching_loop(self, side, quantity, None)?;

        Ok(MarketOrderReport {
            done,
            partial,
            partial_filled,
            quantity_left,
        })
    }
}
