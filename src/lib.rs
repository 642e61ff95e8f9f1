//! A price–time priority limit order book and matching engine for a
//! single trading instrument.
//!
//! The book is organized as three nested components, leaf to root:
//!
//! - [`order_queue::OrderQueue`] — the FIFO of resting orders at one
//!   price, with O(1) head/tail access and O(1) removal given a handle.
//! - [`order_side::OrderSide`] — one side of the book: an ordered price
//!   index over `OrderQueue`s, giving logarithmic best-price, floor, and
//!   ceiling queries.
//! - [`orderbook::OrderBook`] — the façade: admits limit and market
//!   orders, drives the matching loop, and keeps both sides and the
//!   id-to-order index mutually consistent.
//!
//! ```
//! use limit_orderbook::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let book = OrderBook::new("BTC-USD");
//! book.process_limit_order(Side::Sell, OrderId::from("ask-1"), dec!(1), dec!(100))
//!     .unwrap();
//!
//! let report = book
//!     .process_limit_order(Side::Buy, OrderId::from("bid-1"), dec!(1), dec!(100))
//!     .unwrap();
//! assert_eq!(report.done.len(), 1);
//! assert_eq!(report.done[0].maker_order.id, OrderId::from("ask-1"));
//! ```
//!
//! ## Scope
//!
//! This crate is the matching engine and its supporting index
//! structures only. Order ingestion transport, persistence, a clock
//! source beyond the injectable [`clock::Clock`] trait, and
//! multi-instrument orchestration are the caller's responsibility. The
//! engine is not internally synchronized against concurrent mutation of
//! the *same* book — see the concurrency notes on
//! [`orderbook::OrderBook`].

pub mod clock;
pub mod order;
pub mod order_queue;
pub mod order_side;
pub mod orderbook;

pub mod prelude;

pub use order::{Order, OrderId, Side};
pub use orderbook::{
    BookDepth, BookSnapshot, DepthLevel, Fill, LimitOrderReport, MarketOrderReport, OrderBook,
    OrderBookError, OrderSnapshot, QueueSnapshot, SideSnapshot, SnapshotError, SnapshotPackage,
};
