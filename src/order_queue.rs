//! FIFO queue of orders resting at a single price level.
//!
//! Modeled as an arena (slab) of slots addressed by a stable integer
//! handle, per the re-architecture note for the source's intrusive
//! doubly-linked list: the slab owns every slot, and the linkage between
//! slots is expressed as indices rather than pointers, so there is no
//! cycle of owning references to reason about.

use std::sync::Mutex;

use rust_decimal::Decimal;

use crate::order::Order;
use crate::orderbook::error::OrderBookError;

/// A stable reference to an element inside one `OrderQueue`.
///
/// Handles are only meaningful relative to the queue that issued them;
/// passing a handle from one queue into another is a programming error
/// caught by `remove`/`update` returning `InvalidQueue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueHandle(usize);

struct Slot {
    order: Order,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Inner {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    length: usize,
    volume: Decimal,
}

impl Inner {
    fn new() -> Self {
        Inner {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            length: 0,
            volume: Decimal::ZERO,
        }
    }

    fn alloc(&mut self, slot: Slot) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(slot);
            idx
        } else {
            self.slots.push(Some(slot));
            self.slots.len() - 1
        }
    }
}

/// All resting orders at a single price. `price` is fixed at
/// construction and never changes for the lifetime of the queue.
pub struct OrderQueue {
    price: Decimal,
    inner: Mutex<Inner>,
}

impl OrderQueue {
    pub fn new(price: Decimal) -> Self {
        OrderQueue {
            price,
            inner: Mutex::new(Inner::new()),
        }
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn length(&self) -> usize {
        self.inner.lock().unwrap().length
    }

    pub fn volume(&self) -> Decimal {
        self.inner.lock().unwrap().volume
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Push `order` to the tail. Rejects zero/negative quantity and a
    /// price mismatch against this queue's price.
    ///
    /// Does not check for an "already-linked" order: in this arena
    /// design every `append` allocates a brand-new slot regardless of
    /// the `Order` value passed in, so there is no notion of a value
    /// already occupying a slot elsewhere to conflict with — unlike the
    /// source's intrusive-pointer list, where the same node object could
    /// in principle be linked into two lists at once. `AlreadyLinked`
    /// stays in `OrderBookError`'s taxonomy for interface parity with
    /// spec.md §7 but is structurally unreachable through this type; see
    /// DESIGN.md.
    pub fn append(&self, order: Order) -> Result<QueueHandle, OrderBookError> {
        if order.quantity <= Decimal::ZERO {
            return Err(OrderBookError::InvalidQuantity);
        }
        if order.price != self.price {
            return Err(OrderBookError::InvalidPrice);
        }

        let mut inner = self.inner.lock().unwrap();
        let quantity = order.quantity;
        let prev = inner.tail;
        let idx = inner.alloc(Slot {
            order,
            prev,
            next: None,
        });
        match prev {
            Some(prev_idx) => {
                inner.slots[prev_idx].as_mut().unwrap().next = Some(idx);
            }
            None => inner.head = Some(idx),
        }
        inner.tail = Some(idx);
        inner.length += 1;
        inner.volume += quantity;
        Ok(QueueHandle(idx))
    }

    /// Detach and return the order at `handle`.
    pub fn remove(&self, handle: QueueHandle) -> Result<Order, OrderBookError> {
        let mut inner = self.inner.lock().unwrap();
        let idx = handle.0;
        let slot = inner
            .slots
            .get_mut(idx)
            .and_then(|s| s.take())
            .ok_or(OrderBookError::InvalidQueue {
                reason: "handle does not reference a live slot".to_string(),
            })?;

        match (slot.prev, slot.next) {
            (Some(p), Some(n)) => {
                inner.slots[p].as_mut().unwrap().next = Some(n);
                inner.slots[n].as_mut().unwrap().prev = Some(p);
            }
            (Some(p), None) => {
                inner.slots[p].as_mut().unwrap().next = None;
                inner.tail = Some(p);
            }
            (None, Some(n)) => {
                inner.slots[n].as_mut().unwrap().prev = None;
                inner.head = Some(n);
            }
            (None, None) => {
                inner.head = None;
                inner.tail = None;
            }
        }
        inner.free.push(idx);
        inner.length -= 1;
        inner.volume -= slot.order.quantity;
        Ok(slot.order)
    }

    /// Atomically replace the order at `handle` in place, adjusting the
    /// queue's aggregate volume by the quantity delta. The queue position
    /// (and therefore time priority) is unchanged — this is how a partial
    /// fill leaves the residual order at the head of its queue.
    pub fn update(&self, handle: QueueHandle, new_order: Order) -> Result<(), OrderBookError> {
        let mut inner = self.inner.lock().unwrap();
        let idx = handle.0;
        let slot = inner
            .slots
            .get_mut(idx)
            .and_then(|s| s.as_mut())
            .ok_or(OrderBookError::InvalidQueue {
                reason: "handle does not reference a live slot".to_string(),
            })?;
        let delta = new_order.quantity - slot.order.quantity;
        slot.order = new_order;
        inner.volume += delta;
        Ok(())
    }

    /// The earliest-arrived resting order, if any.
    pub fn head(&self) -> Option<Order> {
        let inner = self.inner.lock().unwrap();
        inner
            .head
            .and_then(|idx| inner.slots[idx].as_ref())
            .map(|slot| slot.order.clone())
    }

    /// The earliest-arrived resting order together with the handle that
    /// locates it, if any. The matching loop uses this to consume or
    /// partially fill the head without a second lookup.
    pub fn head_with_handle(&self) -> Option<(QueueHandle, Order)> {
        let inner = self.inner.lock().unwrap();
        inner.head.map(|idx| {
            let slot = inner.slots[idx].as_ref().unwrap();
            (QueueHandle(idx), slot.order.clone())
        })
    }

    /// The most recently arrived resting order, if any.
    pub fn tail(&self) -> Option<Order> {
        let inner = self.inner.lock().unwrap();
        inner
            .tail
            .and_then(|idx| inner.slots[idx].as_ref())
            .map(|slot| slot.order.clone())
    }

    /// Every resting order in arrival order. Used by snapshotting; not a
    /// hot path.
    pub fn orders(&self) -> Vec<Order> {
        let inner = self.inner.lock().unwrap();
        let mut out = Vec::with_capacity(inner.length);
        let mut cursor = inner.head;
        while let Some(idx) = cursor {
            let slot = inner.slots[idx].as_ref().unwrap();
            out.push(slot.order.clone());
            cursor = slot.next;
        }
        out
    }
}
