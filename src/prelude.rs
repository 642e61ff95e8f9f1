//! Convenient re-export of the crate's everyday types.
//!
//! ```
//! use limit_orderbook::prelude::*;
//! ```

pub use crate::clock::{Clock, SystemClock};
pub use crate::order::{Order, OrderId, Side};
pub use crate::orderbook::{
    BookDepth, BookSnapshot, DepthLevel, Fill, LimitOrderReport, MarketOrderReport, OrderBook,
    OrderBookError, OrderSnapshot, QueueSnapshot, SideSnapshot, SnapshotError, SnapshotPackage,
};
