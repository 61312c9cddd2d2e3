//! Ready-to-use monitor implementations.
//!
//! This module contains concrete [`Monitor`](crate::monitoring::Monitor) implementations
//! for common use cases like logging and counting.
//!
//! # Available Monitors
//!
//! - [`Tracer`] - Logs message lifecycle via `tracing` crate
//! - [`DispatchStats`] - Counts posted, handled, failed, and dropped messages
//!
//! # Example
//!
//! ```rust
//! use topicbus::Bus;
//! use topicbus::monitors::{DispatchStats, Tracer};
//!
//! let bus = Bus::new();
//! bus.monitors().add(Tracer);
//!
//! let stats = DispatchStats::new();
//! bus.monitors().add(stats.clone());
//!
//! bus.post("ticks", 42_u64);
//! assert_eq!(stats.posted(), 1);
//! ```

mod tracer;
pub use tracer::Tracer;

mod dispatch_stats;
pub use dispatch_stats::DispatchStats;
