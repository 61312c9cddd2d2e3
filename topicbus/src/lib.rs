#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Topicbus
//!
//! An in-process, topic-based publish/subscribe bus.
//!
//! Handlers subscribe to a topic pattern for one message type and get a
//! priority. Publishers post any `Send + Sync + 'static` value under a
//! concrete topic, either synchronously (handlers run on the caller's thread
//! and their responses come back) or asynchronously (the message is queued
//! for a single worker thread and the call returns at once).
//!
//! ## Quick Start
//!
//! ```rust
//! use topicbus::*;
//!
//! #[derive(Debug)]
//! struct TradeEvent {
//!     symbol: String,
//!     price: f64,
//! }
//!
//! struct RiskResult {
//!     allowed: bool,
//! }
//!
//! fn main() -> Result {
//!     let bus = Bus::new();
//!     bus.start()?;
//!
//!     // Lower priority values run first
//!     bus.subscribe_with_priority("trade.*", 10, |t: &TradeEvent| {
//!         Response::new(RiskResult { allowed: t.price < 1000.0 })
//!     });
//!     bus.subscribe("trade.executed", |t: &TradeEvent| {
//!         println!("executed {} @ {}", t.symbol, t.price);
//!     });
//!
//!     let responses = bus.post("trade.new", TradeEvent { symbol: "AAPL".into(), price: 150.25 });
//!     assert!(responses[0].get::<RiskResult>().is_some_and(|r| r.allowed));
//!
//!     bus.post_async("trade.executed", TradeEvent { symbol: "AAPL".into(), price: 150.25 });
//!     bus.stop()
//! }
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bus`] | Registry, dispatch, and worker lifecycle |
//! | [`Message`] | Marker for publishable values (blanket-implemented) |
//! | [`TopicPattern`] | Parsed subscription pattern: `*`, `prefix.*`, or exact |
//! | [`Response`] | Type-erased handler result; may be void |
//! | [`IntoResponse`] | What a handler closure may return |
//! | [`Envelope`] | Posted message with its [`Meta`] (id, timestamp, topic, type) |
//! | [`SubscriptionId`] | Process-wide unique handle returned by subscribe |
//! | [`SubscriptionGuard`] | Unsubscribes exactly once on release or drop |
//! | [`Config`] | Worker thread name, stack size, default priority |
//!
//! ## Topic Matching
//!
//! A pattern ending in `*` matches every topic starting with the text before
//! it; any other pattern matches only the identical topic. A `*` elsewhere
//! is literal. See [`topic`] for details.
//!
//! ## Ordering
//!
//! Matching handlers run one after another in ascending priority; ties run
//! in subscription order. Asynchronous messages are dispatched in the global
//! order they were queued, one at a time.
//!
//! ## Failure Isolation
//!
//! A handler that returns an error or panics is logged through `tracing`,
//! reported to attached [`monitoring::Monitor`]s, and skipped. The remaining
//! handlers still run and the publisher never observes the failure.
//!
//! ## Features
//!
//! - **`serde`** - Serialize ids, [`monitoring::DispatchMode`], and [`Config`]; `Bus::to_json()`
//!
//! ## Examples
//!
//! See the `examples/` directory:
//!
//! - `hello-world.rs` - Minimal publish and subscribe
//! - `trading.rs` - Risk checks, notifications, and scoped subscriptions

mod bus;
mod config;
mod envelope;
mod error;
mod message;
mod message_id;
mod meta;
mod response;
mod subscription_builder;
mod subscription_guard;
mod subscription_id;
mod subscription_info;

mod internal;

pub mod monitoring;
pub mod monitors;
pub mod topic;

pub use bus::Bus;
pub use config::Config;
pub use envelope::Envelope;
pub use error::Error;
pub use message::{Message, MessageType};
pub use message_id::MessageId;
pub use meta::Meta;
pub use response::{IntoResponse, Response};
pub use subscription_builder::SubscriptionBuilder;
pub use subscription_guard::SubscriptionGuard;
pub use subscription_id::SubscriptionId;
pub use subscription_info::SubscriptionInfo;
pub use topic::TopicPattern;

/// Convenience alias for `Result<T, topicbus::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
