//! The order book façade: admission/matching, cancellation, lookups,
//! depth snapshots, and serialization.

mod book;
mod error;
mod matching;
mod operations;
mod snapshot;
mod trade;

pub use book::OrderBook;
pub use error::OrderBookError;
pub use operations::{BookDepth, DepthLevel};
pub use snapshot::{
    BookSnapshot, OrderSnapshot, QueueSnapshot, SideSnapshot, SnapshotError, SnapshotPackage,
    SNAPSHOT_FORMAT_VERSION,
};
pub use trade::{Fill, LimitOrderReport, MarketOrderReport};
